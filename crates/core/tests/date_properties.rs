use chrono::NaiveDate;
use proptest::prelude::*;

use defibcheck_core::{normalize_serial, parse_date, DateGranularity};

fn valid_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2060, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #[test]
    fn every_supported_day_format_parses(date in valid_date()) {
        for fmt in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d/%m/%Y %H:%M", "%d/%m/%Y %H:%M:%S"] {
            let raw = date.and_hms_opt(9, 30, 0).unwrap().format(fmt).to_string();
            let parsed = parse_date(&raw);
            prop_assert!(parsed.is_ok(), "{raw} should parse");
            let parsed = parsed.unwrap();
            prop_assert_eq!(parsed.date, date);
            prop_assert_eq!(parsed.granularity, DateGranularity::Day);
        }
    }

    #[test]
    fn month_year_forms_keep_month(date in valid_date()) {
        for fmt in ["%m/%Y", "%m-%Y", "%Y-%m"] {
            let raw = date.format(fmt).to_string();
            let parsed = parse_date(&raw).unwrap();
            prop_assert!(parsed.is_month_only());
            let full = parse_date(&date.format("%d/%m/%Y").to_string()).unwrap();
            prop_assert!(parsed.matches(&full));
        }
    }

    #[test]
    fn letter_only_strings_fail_with_message(s in "[a-zA-Z ]{0,20}") {
        // A lone month name without a year is not a date either
        let err = parse_date(&s).unwrap_err();
        prop_assert!(!err.to_string().is_empty());
    }

    #[test]
    fn serial_normalization_ignores_case_and_dashes(s in "[A-Z1-9]{3,12}") {
        let dashed: String = s.chars().flat_map(|c| [c.to_ascii_lowercase(), '-']).collect();
        prop_assert_eq!(normalize_serial(&s), normalize_serial(&dashed));
    }
}
