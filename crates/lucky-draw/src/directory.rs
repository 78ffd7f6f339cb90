//! Company list for the sign-in dropdown.

use crate::roster::{Column, RosterFormat};
use std::collections::BTreeSet;

const FALLBACK_COMPANIES: &[&str] = &[
    "LEO",
    "Starcom",
    "Zenith",
    "Prodigious",
    "Digitas",
    "Performics",
    "MSL",
    "PMX",
    "Saatchi & Saatchi",
    "SSC",
    "Human Resource",
    "Finance",
    "Administration",
    "Management",
    "Growth Intelligence",
    "Collective",
    "Commercial",
    "Spark",
    "Core",
];

/// A company label that must never appear in the dropdown. Matching ignores case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Exact(String),
    Contains(String),
}

impl Exclusion {
    fn excludes(&self, lowered: &str) -> bool {
        match self {
            Exclusion::Exact(value) => lowered == value.to_lowercase(),
            Exclusion::Contains(value) => lowered.contains(&value.to_lowercase()),
        }
    }
}

/// Rules for turning roster rows into the company dropdown.
#[derive(Debug, Clone)]
pub struct DirectoryPolicy {
    pub company: Column,
    pub min_columns: usize,
    pub exclusions: Vec<Exclusion>,
    pub sentinel: String,
    pub fallback: Vec<String>,
}

impl DirectoryPolicy {
    /// The event's rules, reading the company column of `format`.
    pub fn for_format(format: &RosterFormat) -> Self {
        Self {
            company: format.company,
            min_columns: format.min_columns,
            exclusions: vec![
                Exclusion::Exact("publicis".to_string()),
                Exclusion::Contains("resource".to_string()),
            ],
            sentinel: "SSC".to_string(),
            fallback: FALLBACK_COMPANIES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Distinct, sorted company labels from the data rows (header skipped), sentinel included.
    pub fn build(&self, rows: &[Vec<String>]) -> Vec<String> {
        let mut companies = BTreeSet::new();

        for row in rows.iter().skip(1) {
            if row.len() < self.min_columns {
                continue;
            }
            let Some(label) = self.company.extract(row).and_then(|raw| self.clean(raw)) else {
                continue;
            };
            companies.insert(label);
        }

        companies.insert(self.sentinel.clone());
        companies.into_iter().collect()
    }

    /// The fixed list served when the roster cannot be read.
    pub fn fallback(&self) -> Vec<String> {
        let mut companies = self.fallback.clone();
        companies.sort();
        companies.dedup();
        companies
    }

    fn clean(&self, raw: &str) -> Option<String> {
        if raw.chars().count() <= 1 {
            return None;
        }

        let cleaned = strip_cjk(raw).trim().to_string();
        if cleaned == "-" || cleaned.chars().count() <= 1 {
            return None;
        }

        let lowered = cleaned.to_lowercase();
        if self.exclusions.iter().any(|rule| rule.excludes(&lowered)) {
            return None;
        }

        Some(cleaned)
    }
}

fn strip_cjk(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !('\u{4e00}'..='\u{9fa5}').contains(ch))
        .collect()
}
