/// Placeholders exports use to mean "nothing here".
pub const NONE_MARKERS: &[&str] = &["-", "無"];

/// A positional column plus the tokens that count as an empty cell in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub empty_markers: &'static [&'static str],
}

impl Column {
    pub const fn at(index: usize) -> Self {
        Self {
            index,
            empty_markers: &[],
        }
    }

    pub const fn with_markers(index: usize, empty_markers: &'static [&'static str]) -> Self {
        Self {
            index,
            empty_markers,
        }
    }

    /// Trimmed cell value, or `None` when the cell is missing, blank, or a marker.
    pub fn extract<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        let value = row.get(self.index)?.trim();
        if value.is_empty() || self.empty_markers.contains(&value) {
            None
        } else {
            Some(value)
        }
    }
}

/// Declares where each field lives in one historical roster export.
///
/// Every export revision moved the columns around; describing each shape once keeps that drift
/// out of the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterFormat {
    pub name: &'static str,
    pub id: Option<Column>,
    pub base_prize: Column,
    pub voucher_brand: Option<Column>,
    pub voucher_amount: Option<Column>,
    pub attendee_name: Column,
    pub company: Column,
    pub min_columns: usize,
}

impl RosterFormat {
    /// `ID,Count,Prize,...,VoucherBrand,VoucherAmount,Name,Company`
    pub const VOUCHER_LEDGER: RosterFormat = RosterFormat {
        name: "voucher_ledger",
        id: Some(Column::at(0)),
        base_prize: Column::at(2),
        voucher_brand: Some(Column::with_markers(6, NONE_MARKERS)),
        voucher_amount: Some(Column::with_markers(7, NONE_MARKERS)),
        attendee_name: Column::at(8),
        company: Column::at(9),
        min_columns: 10,
    };

    /// `ID,Count,Prize,Voucher,Name,Company`
    pub const PRIZE_SUMMARY: RosterFormat = RosterFormat {
        name: "prize_summary",
        id: Some(Column::at(0)),
        base_prize: Column::at(2),
        voucher_brand: None,
        voucher_amount: None,
        attendee_name: Column::at(4),
        company: Column::with_markers(5, NONE_MARKERS),
        min_columns: 6,
    };

    /// `Unit,Dept,ChineseName,EnglishName,Prize`
    pub const UNIT_ROSTER: RosterFormat = RosterFormat {
        name: "unit_roster",
        id: None,
        base_prize: Column::at(4),
        voucher_brand: None,
        voucher_amount: None,
        attendee_name: Column::at(3),
        company: Column::at(1),
        min_columns: 5,
    };

    pub const ALL: [RosterFormat; 3] = [
        Self::VOUCHER_LEDGER,
        Self::PRIZE_SUMMARY,
        Self::UNIT_ROSTER,
    ];

    pub fn from_name(value: &str) -> Option<Self> {
        let wanted = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|format| format.name == wanted)
    }

    pub fn known_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|format| format.name).collect()
    }
}
