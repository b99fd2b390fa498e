// Property-based tests for the A1 codec.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use sheetdb_core::a1::{format_range, parse_range, MAX_COLUMN, MAX_ROW_NUMBER};
use sheetdb_core::{parse_a1, Bound, CellRange};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Finite, non-empty ranges that A1 can express.
fn arb_finite_range() -> impl Strategy<Value = CellRange> {
    (0..MAX_ROW_NUMBER, 0..=MAX_COLUMN)
        .prop_flat_map(|(row, col)| {
            let max_rows = (MAX_ROW_NUMBER - row).min(500);
            let max_cols = MAX_COLUMN + 1 - col;
            (Just(row), Just(col), 1..=max_rows, 1..=max_cols)
        })
        .prop_map(|(row, col, rows, cols)| CellRange::with_size(row, col, rows, cols))
}

fn arb_sheet_title() -> impl Strategy<Value = String> {
    prop_oneof![
        r"[A-Za-z_][A-Za-z0-9_]{0,12}",
        r"[A-Za-z' !]{1,12}",
    ]
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn format_then_parse_is_identity(range in arb_finite_range()) {
        let text = format_range(&range).unwrap();
        prop_assert_eq!(parse_range(&text).unwrap(), range);
    }

    #[test]
    fn reversed_corners_normalise(range in arb_finite_range()) {
        let text = format_range(&range).unwrap();
        if let Some((nw, se)) = text.split_once(':') {
            let reversed = format!("{se}:{nw}");
            prop_assert_eq!(parse_range(&reversed).unwrap(), range);
        }
    }

    #[test]
    fn lowercase_parses_the_same(range in arb_finite_range()) {
        let text = format_range(&range).unwrap();
        prop_assert_eq!(parse_range(&text.to_lowercase()).unwrap(), range);
    }

    #[test]
    fn sheet_titles_survive_quoting(title in arb_sheet_title(), range in arb_finite_range()) {
        let text = sheetdb_core::format_address(Some(&title), &range).unwrap();
        let parsed = parse_a1(&text).unwrap();
        prop_assert_eq!(parsed.sheet.as_deref(), Some(title.as_str()));
        prop_assert_eq!(parsed.range, range);
    }

    #[test]
    fn whole_columns_are_unbounded_on_rows(start in 0..=MAX_COLUMN, len in 0usize..5) {
        let end = (start + len).min(MAX_COLUMN);
        let range = CellRange::new(0, Bound::Unbounded, start, Bound::At(end + 1));
        let text = format_range(&range).unwrap();
        let parsed = parse_range(&text).unwrap();
        prop_assert_eq!(parsed.end_row, Bound::Unbounded);
        prop_assert_eq!(parsed.start_col, start);
        prop_assert_eq!(parsed.end_col, Bound::At(end + 1));
    }

    #[test]
    fn growth_is_zero_inside_and_positive_outside(
        inner in arb_finite_range(),
        rows in 1usize..2000,
        cols in 1usize..800,
    ) {
        let current = CellRange::with_size(0, 0, rows, cols);
        let (dr, dc) = current.growth_needed(&inner);
        let end_row = inner.end_row.finite().unwrap();
        let end_col = inner.end_col.finite().unwrap();
        prop_assert_eq!(dr > 0, end_row > rows);
        prop_assert_eq!(dc > 0, end_col > cols);
        prop_assert_eq!(dr, end_row.saturating_sub(rows));
        prop_assert_eq!(dc, end_col.saturating_sub(cols));
        if current.encloses(&inner) {
            prop_assert_eq!((dr, dc), (0, 0));
        }
    }
}
