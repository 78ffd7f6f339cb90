use crate::roster::RosterRecord;
use serde::Serialize;

/// Splits display lines in a composed prize string.
pub const PRIZE_SEPARATOR: &str = "|||";
/// Prefixes a voucher line that accompanies a physical prize.
pub const ADD_ON_MARKER: &str = "+";
/// Generic prize text meaning "a voucher"; the voucher columns carry the specifics.
pub const VOUCHER_PLACEHOLDER: &str = "禮券";
const CURRENCY_UNIT: &str = "元";

/// Result of composing the prize for a set of matched records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrizeOutcome {
    /// No record matched the search.
    NotFound,
    /// Records matched but none carried prize or voucher text.
    MatchedWithoutPrize,
    Awarded { prize: String, ids: Vec<String> },
}

/// Wire label for a [`PrizeOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Awarded,
    NotFound,
    MatchedWithoutPrize,
}

impl PrizeOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            PrizeOutcome::NotFound => OutcomeKind::NotFound,
            PrizeOutcome::MatchedWithoutPrize => OutcomeKind::MatchedWithoutPrize,
            PrizeOutcome::Awarded { .. } => OutcomeKind::Awarded,
        }
    }

    /// The prize string older clients expect: `None` for both empty outcomes.
    pub fn legacy_prize(&self) -> Option<&str> {
        match self {
            PrizeOutcome::Awarded { prize, .. } => Some(prize),
            PrizeOutcome::NotFound | PrizeOutcome::MatchedWithoutPrize => None,
        }
    }

    /// Row ids of the awarding records joined for display, if any.
    pub fn joined_ids(&self) -> Option<String> {
        match self {
            PrizeOutcome::Awarded { ids, .. } if !ids.is_empty() => Some(ids.join(", ")),
            _ => None,
        }
    }
}

/// Strips quote characters and thousands separators from a voucher amount.
pub fn clean_amount(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '"' | '\'' | ','))
        .collect::<String>()
        .trim()
        .to_string()
}

fn voucher_line(record: &RosterRecord) -> Option<String> {
    let brand = record.voucher_brand.as_deref()?;
    let amount = record
        .voucher_amount
        .as_deref()
        .map(clean_amount)
        .filter(|amount| !amount.is_empty());

    Some(match amount {
        Some(amount) => format!("{brand} {amount}{CURRENCY_UNIT} {VOUCHER_PLACEHOLDER}"),
        None => format!("{brand} {VOUCHER_PLACEHOLDER}"),
    })
}

/// Display text for one record, or `None` when it carries neither a prize nor a voucher.
pub fn record_prize(record: &RosterRecord) -> Option<String> {
    let base = record.base_prize.trim();
    let voucher = voucher_line(record);

    match (base, voucher) {
        ("", None) => None,
        ("", Some(voucher)) => Some(voucher),
        (VOUCHER_PLACEHOLDER, Some(voucher)) => Some(voucher),
        (base, Some(voucher)) => Some(format!("{base}{PRIZE_SEPARATOR}{ADD_ON_MARKER}{voucher}")),
        (base, None) => Some(base.to_string()),
    }
}

/// Merges matched records into one prize string, keeping first occurrences in order.
pub fn compose(matched: &[&RosterRecord]) -> PrizeOutcome {
    if matched.is_empty() {
        return PrizeOutcome::NotFound;
    }

    let mut prizes: Vec<String> = Vec::new();
    let mut ids: Vec<String> = Vec::new();

    for record in matched {
        let Some(prize) = record_prize(record) else {
            continue;
        };

        if !prizes.contains(&prize) {
            prizes.push(prize);
        }
        if let Some(id) = record.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
    }

    if prizes.is_empty() {
        return PrizeOutcome::MatchedWithoutPrize;
    }

    PrizeOutcome::Awarded {
        prize: prizes.join(PRIZE_SEPARATOR),
        ids,
    }
}
