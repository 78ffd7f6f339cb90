use super::format::RosterFormat;
use serde::Serialize;

/// One attendee's prize assignment, as read from a single roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRecord {
    pub id: Option<String>,
    pub name: String,
    pub company: String,
    pub base_prize: String,
    pub voucher_brand: Option<String>,
    pub voucher_amount: Option<String>,
}

/// Maps a raw row onto a record using the declared format.
///
/// Returns `None` for rows narrower than the format or rows without a name; callers skip those
/// rows rather than failing the whole roster.
pub fn normalize(row: &[String], format: &RosterFormat) -> Option<RosterRecord> {
    if row.len() < format.min_columns {
        return None;
    }

    let name = format.attendee_name.extract(row)?.to_string();
    let owned = |value: Option<&str>| value.map(str::to_string);

    Some(RosterRecord {
        id: owned(format.id.and_then(|column| column.extract(row))),
        name,
        company: format.company.extract(row).unwrap_or_default().to_string(),
        base_prize: format.base_prize.extract(row).unwrap_or_default().to_string(),
        voucher_brand: owned(format.voucher_brand.and_then(|column| column.extract(row))),
        voucher_amount: owned(format.voucher_amount.and_then(|column| column.extract(row))),
    })
}

/// Normalizes every data row, skipping the header line and any row that yields no record.
pub fn normalize_rows(rows: &[Vec<String>], format: &RosterFormat) -> Vec<RosterRecord> {
    rows.iter()
        .skip(1)
        .filter_map(|row| normalize(row, format))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn ledger_row_maps_voucher_columns() {
        let cells = row(&[
            "17", "1", "禮券", "", "", "", "新光三越", "3,000", " 王小明 ", "LEO",
        ]);
        let record = normalize(&cells, &RosterFormat::VOUCHER_LEDGER).expect("record");
        assert_eq!(record.id.as_deref(), Some("17"));
        assert_eq!(record.name, "王小明");
        assert_eq!(record.company, "LEO");
        assert_eq!(record.base_prize, "禮券");
        assert_eq!(record.voucher_brand.as_deref(), Some("新光三越"));
        assert_eq!(record.voucher_amount.as_deref(), Some("3,000"));
    }

    #[test]
    fn none_placeholders_clear_voucher_fields() {
        let cells = row(&["3", "1", "Apple Homepod mini", "", "", "", "無", "-", "Kart Jian", "LEO"]);
        let record = normalize(&cells, &RosterFormat::VOUCHER_LEDGER).expect("record");
        assert_eq!(record.voucher_brand, None);
        assert_eq!(record.voucher_amount, None);
    }

    #[test]
    fn short_rows_and_blank_names_are_rejected() {
        let short = row(&["ReSources", "SSC", "羅文妮", "Winnie Lo"]);
        assert!(normalize(&short, &RosterFormat::UNIT_ROSTER).is_none());

        let blank = row(&["ReSources", "SSC", "羅文妮", "   ", "SAMPO氣炸烤箱 KZ-RA13B"]);
        assert!(normalize(&blank, &RosterFormat::UNIT_ROSTER).is_none());
    }

    #[test]
    fn name_is_always_the_trimmed_raw_field() {
        for raw in ["Winnie Lo", "  Winnie Lo", "Winnie Lo\t", " 羅文妮 "] {
            let cells = row(&["ReSources", "SSC", "羅文妮", raw, "prize"]);
            let record = normalize(&cells, &RosterFormat::UNIT_ROSTER).expect("record");
            assert_eq!(record.name, raw.trim());
        }
    }

    #[test]
    fn unit_roster_has_no_id_or_voucher() {
        let cells = row(&["ReSources", "SSC", "羅文妮", "Winnie Lo", "SAMPO氣炸烤箱 KZ-RA13B"]);
        let record = normalize(&cells, &RosterFormat::UNIT_ROSTER).expect("record");
        assert_eq!(record.id, None);
        assert_eq!(record.company, "SSC");
        assert_eq!(record.base_prize, "SAMPO氣炸烤箱 KZ-RA13B");
        assert_eq!(record.voucher_brand, None);
    }

    #[test]
    fn normalize_rows_skips_header() {
        let rows = vec![
            row(&["Unit", "Dept", "Chinese", "English", "Prize"]),
            row(&["LEO", "CR", "楊乃菁", "Jin Yang", "新光三越3000禮券"]),
            row(&["LEO", "CR"]),
        ];
        let records = normalize_rows(&rows, &RosterFormat::UNIT_ROSTER);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Jin Yang");
    }
}
