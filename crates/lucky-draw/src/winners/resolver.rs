use crate::roster::RosterRecord;

/// Lower-cases and removes every whitespace character, so `" Publicis Media "` and
/// `"publicismedia"` compare equal.
pub fn clean_company(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Either cleaned company contains the other.
pub fn companies_overlap(record_company: &str, search_company: &str) -> bool {
    record_company.contains(search_company) || search_company.contains(record_company)
}

/// Records whose name equals `search_name` exactly (after trimming) and whose company overlaps
/// the searched company, in roster order.
///
/// The company filter only applies when both the search and the record carry a company. Names
/// never match partially or case-insensitively.
pub fn resolve<'a>(
    records: &'a [RosterRecord],
    search_name: &str,
    search_company: Option<&str>,
) -> Vec<&'a RosterRecord> {
    let search_name = search_name.trim();
    let search_company = search_company.map(clean_company).unwrap_or_default();

    records
        .iter()
        .filter(|record| {
            if !search_company.is_empty() {
                let record_company = clean_company(&record.company);
                if !record_company.is_empty()
                    && !companies_overlap(&record_company, &search_company)
                {
                    return false;
                }
            }

            record.name.trim() == search_name
        })
        .collect()
}
