use realize_core::{BonusRule, CalendarWeek, ScoringPolicy};
use realize_ingest::{
    IngestError, NormalizeOptions, SourceEncoding, decode, normalize, read_and_decode,
};
use realize_report::{EmitOptions, Report, write_csv};
use rust_decimal::Decimal;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("campaign_kw18_kw19.csv")
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn build_report(text: &str) -> Report {
    let normalized = normalize(text, &NormalizeOptions::default()).unwrap();
    Report::build(normalized, &ScoringPolicy::default(), &BonusRule::default())
}

fn fixture_report() -> Report {
    let decoded = read_and_decode(fixture_path(), &SourceEncoding::DEFAULT_CHAIN).unwrap();
    assert_eq!(decoded.encoding, SourceEncoding::Utf8);
    build_report(&decoded.text)
}

fn emit(report: &Report) -> String {
    let mut buf = Vec::new();
    write_csv(
        report,
        &mut buf,
        &EmitOptions {
            title: Some("WoVi_CW_Formatted_2025-07-30".to_string()),
            ..EmitOptions::default()
        },
    )
    .unwrap();
    String::from_utf8(buf).unwrap()
}

/// Real-export shape: preamble, fill-down blocks, a previous subtotal line,
/// a malformed age and a year boundary.
#[test]
fn test_fixture_groups_and_subtotals() {
    let report = fixture_report();

    assert_eq!(report.accepted_count(), 10);
    assert_eq!(report.rejected_count(), 1);
    assert_eq!(report.summary_rows_skipped(), 1);

    let rejected = &report.rejected()[0];
    assert_eq!(rejected.field, "Age");
    assert_eq!(rejected.row_index, 5);
    assert_eq!(rejected.line, 9);
    assert!(rejected.reason.contains("abc"));

    let summary: Vec<(String, &str, Decimal, bool)> = report
        .groups()
        .iter()
        .map(|g| {
            (
                g.calendar_week().to_string(),
                g.fundraiser_id().as_str(),
                g.subtotal_points(),
                g.bonus_eligible(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("52/2024".to_string(), "00012", d("4"), true),
            ("1/2025".to_string(), "00012", d("2"), true),
            ("18/2025".to_string(), "00012", d("2"), true),
            ("18/2025".to_string(), "00004", d("10"), false),
            ("19/2025".to_string(), "00004", d("7.5"), false),
        ]
    );
}

#[test]
fn test_bonus_withheld_only_on_age_bonus_members() {
    let report = fixture_report();
    let week19 = report
        .groups()
        .iter()
        .find(|g| g.calendar_week() == CalendarWeek::new(2025, 19).unwrap())
        .unwrap();

    let points: Vec<(&str, Decimal, bool)> = week19
        .members()
        .iter()
        .map(|m| (m.scored.record.donor_ref.as_str(), m.effective_points, m.bonus_withheld))
        .collect();
    assert_eq!(
        points,
        vec![
            ("WV-1007", d("2.5"), true),
            ("WV-1008", d("0"), false),
            ("WV-1009", d("5"), false),
        ]
    );
}

#[test]
fn test_weekly_summary_from_fixture() {
    let report = fixture_report();
    let weeks = report.weekly_summary();
    let rows: Vec<(String, Decimal, bool)> = weeks
        .iter()
        .map(|w| (w.week.to_string(), w.total_points, w.bonus_eligible))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("52/2024".to_string(), d("4"), true),
            ("1/2025".to_string(), d("2"), true),
            ("18/2025".to_string(), d("12"), true),
            ("19/2025".to_string(), d("7.5"), false),
        ]
    );
}

#[test]
fn test_breakdowns_from_fixture() {
    let report = fixture_report();
    let list = report.breakdowns();
    assert_eq!(list.len(), 2);

    let ben = &list[0];
    assert_eq!(ben.fundraiser_name, "Ben Özdemir");
    assert_eq!(ben.weeks.len(), 3);
    assert_eq!(ben.period.month, "Dezember");
    assert_eq!(ben.period.year, 2024);
    assert_eq!(ben.total_points, d("8"));

    let charlotte = &list[1];
    assert_eq!(charlotte.fundraiser_id.as_str(), "00004");
    assert_eq!(charlotte.total_points, d("17.5"));
    assert_eq!(charlotte.eligible_weeks, 0);
}

#[test]
fn test_emitted_csv_shape() {
    let text = emit(&fixture_report());
    let lines: Vec<&str> = text.lines().collect();

    // preamble + header + 10 donors + 5 subtotals
    assert_eq!(lines.len(), 2 + 1 + 10 + 5);
    assert_eq!(lines[3], "00012;Ben Özdemir;52/2024;WV-1010;41;Monthly;360;approved;4;;");
    assert_eq!(lines[4], "00012;Ben Özdemir;52/2024;Subtotal;;;;;4;100%;eligible");
    assert_eq!(lines[5], "00012;Ben Özdemir;KW 1;WV-1011;30;Yearly;120;approved;2;;");
    assert_eq!(
        lines[lines.len() - 1],
        "00004;Charlotte Lui;19/2025;Subtotal;;;;;7,5;66,67%;not-eligible"
    );
}

#[test]
fn test_reingesting_output_is_stable() {
    let first = emit(&fixture_report());
    let again = build_report(&first);

    assert_eq!(again.accepted_count(), 10);
    assert_eq!(again.rejected_count(), 0);
    assert_eq!(again.summary_rows_skipped(), 5);
    assert_eq!(emit(&again), first);
}

#[test]
fn test_windows_1252_input() {
    let utf8 = std::fs::read_to_string(fixture_path()).unwrap();
    let bytes: Vec<u8> = utf8
        .trim_start_matches('\u{feff}')
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap())
        .collect();

    let decoded = decode(&bytes, &SourceEncoding::DEFAULT_CHAIN).unwrap();
    assert_eq!(decoded.encoding, SourceEncoding::Windows1252);
    let report = build_report(&decoded.text);
    assert!(report.groups().iter().any(|g| g.fundraiser_name() == "Ben Özdemir"));

    let err = decode(&bytes, &[SourceEncoding::Utf8]).unwrap_err();
    assert!(matches!(err, IngestError::FileDecode { .. }));
}

#[test]
fn test_single_young_donor() {
    let report = build_report(
        "Fundraiser ID;Fundraiser Name;Calendar week;Public RefID;Age;Interval;Amount Yearly;status_agency\n\
         1;Mara Klein;18/2025;R-1;22;Yearly;5000;approved\n",
    );
    let g = &report.groups()[0];
    assert_eq!(g.subtotal_points(), d("0.5"));
    assert_eq!(g.realization_ratio(), Decimal::ONE);
    assert!(g.bonus_eligible());
}

/// `KW 1` follows `52/2024` in the export, so it lands in 2025 whatever
/// fallback year is configured.
#[test]
fn test_fixture_undated_week_year_comes_from_file() {
    let decoded = read_and_decode(fixture_path(), &SourceEncoding::DEFAULT_CHAIN).unwrap();
    for default_year in [None, Some(2025), Some(2031)] {
        let normalized = normalize(
            &decoded.text,
            &NormalizeOptions {
                default_year,
                ..NormalizeOptions::default()
            },
        )
        .unwrap();
        let report = Report::build(normalized, &ScoringPolicy::default(), &BonusRule::default());
        let weeks: Vec<CalendarWeek> = report.groups().iter().map(|g| g.calendar_week()).collect();
        assert!(weeks.contains(&CalendarWeek { year: 2025, week: 1 }), "{default_year:?}");
        assert!(weeks.iter().all(|w| w.year == 2024 || w.year == 2025));
    }
}
