use lucky_draw::directory::DirectoryPolicy;
use lucky_draw::roster::{
    normalize_rows, rows_from_bytes, DelimitedText, FlattenedTable, RosterFormat, RosterSource,
    SourceShape, SpreadsheetGrid,
};
use lucky_draw::winners::{lookup, resolve, PrizeOutcome};

const SEED_ROSTER: &str = "Unit,Dept,ChineseName,EnglishName,Prize\n\
ReSources,SSC,羅文妮,Winnie Lo,SAMPO氣炸烤箱 KZ-RA13B\n\
ReSources,SSC,徐麗馨,Lisa Hsu,新光三越3000禮券\n\
Prodigious,PD,王穎娜,Tina Wang,新光三越3000禮券\n\
LEO,CR,楊乃菁,Jin Yang,新光三越3000禮券\n\
LEO,CS,沈婉菁,Ruby Shen,新光三越3000禮券\n\
MSL,CS,藍英綸,Jay Lan,新光三越3000禮券\n";

#[test]
fn five_column_roster_resolves_a_single_winner() {
    let rows = DelimitedText::new(SEED_ROSTER).rows();
    let records = normalize_rows(&rows, &RosterFormat::UNIT_ROSTER);
    assert_eq!(records.len(), 6);

    let matched = resolve(&records, "Winnie Lo", Some("ssc"));
    assert_eq!(matched.len(), 1);

    match lookup(&records, "Winnie Lo", Some("ssc")) {
        PrizeOutcome::Awarded { prize, .. } => assert_eq!(prize, "SAMPO氣炸烤箱 KZ-RA13B"),
        other => panic!("expected an award, got {other:?}"),
    }
}

#[test]
fn every_source_shape_yields_the_same_records() {
    let grid = SpreadsheetGrid::new(
        DelimitedText::new(SEED_ROSTER)
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(|cell| format!(" {cell} ")).collect())
            .collect(),
    );
    let flattened = FlattenedTable::new(SEED_ROSTER.replace(',', "\t"));

    let expected = normalize_rows(&DelimitedText::new(SEED_ROSTER).rows(), &RosterFormat::UNIT_ROSTER);
    assert_eq!(
        normalize_rows(&grid.rows(), &RosterFormat::UNIT_ROSTER),
        expected
    );
    assert_eq!(
        normalize_rows(&flattened.rows(), &RosterFormat::UNIT_ROSTER),
        expected
    );
}

#[test]
fn uploaded_bytes_with_bom_parse_like_fetched_ones() {
    let bytes = format!("\u{feff}{}", SEED_ROSTER.replace('\n', "\r\n")).into_bytes();
    let rows = rows_from_bytes(&bytes, SourceShape::Delimited).expect("decodes");
    assert_eq!(rows[0][0], "Unit");
    assert_eq!(
        normalize_rows(&rows, &RosterFormat::UNIT_ROSTER).len(),
        6
    );
}

#[test]
fn directory_over_unit_roster_uses_the_department_column() {
    let rows = DelimitedText::new(SEED_ROSTER).rows();
    let directory = DirectoryPolicy::for_format(&RosterFormat::UNIT_ROSTER).build(&rows);
    assert_eq!(directory, vec!["CR", "CS", "PD", "SSC"]);
}
