//! A1-notation codec.
//!
//! Grammar: `[ 'Sheet Name' | SheetName ] '!' Token [ ':' Token ]` where
//! `Token = Letters? Digits?`. A missing `!` prefix addresses the caller's
//! current sheet. A side of the colon may omit letters or digits:
//!
//! - `7:10`  whole rows 7..=10
//! - `B:E`   whole columns B..=E
//! - `B7:`   from B7 to the sheet edge on both axes
//!
//! Omitted parts resolve to 0 on the northwest corner and to
//! [`Bound::Unbounded`] on the southeast corner. Reversed corners are
//! normalised. The grammar rejects whitespace inside the range token.

use crate::error::AddressError;
use crate::range::{Bound, CellRange};

/// Highest column index with an A1 name (`ZZ`).
pub const MAX_COLUMN: usize = 26 * 26 + 25;

/// Highest 1-based row number the grammar accepts (five digits).
pub const MAX_ROW_NUMBER: usize = 99_999;

/// Which end of a range a corner lookup resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    /// Start corner, always finite.
    NorthWest,
    /// Exclusive end corner, possibly unbounded.
    SouthEast,
}

/// A parsed symbolic address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct A1Ref {
    /// Sheet title, `None` for the implicit current sheet.
    pub sheet: Option<String>,
    pub range: CellRange,
}

impl A1Ref {
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        parse_a1(text)
    }

    pub fn to_a1(&self) -> Result<String, AddressError> {
        format_address(self.sheet.as_deref(), &self.range)
    }
}

impl std::str::FromStr for A1Ref {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_a1(s)
    }
}

/// One side of a `:`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Side {
    row: Option<usize>,
    col: Option<usize>,
}

/// Parse a full address, with or without a sheet prefix.
pub fn parse_a1(text: &str) -> Result<A1Ref, AddressError> {
    let (sheet, token) = split_sheet(text)?;
    let range = parse_range(token)?;
    Ok(A1Ref { sheet, range })
}

/// Resolve one corner of an address as (row, column).
///
/// The northwest corner is always finite; the southeast corner is the
/// exclusive end and may be unbounded on either axis.
pub fn parse_corner(text: &str, corner: Corner) -> Result<(Bound, Bound), AddressError> {
    let range = parse_a1(text)?.range;
    Ok(match corner {
        Corner::NorthWest => (Bound::At(range.start_row), Bound::At(range.start_col)),
        Corner::SouthEast => (range.end_row, range.end_col),
    })
}

/// Parse the range part of an address (everything after `!`).
pub fn parse_range(token: &str) -> Result<CellRange, AddressError> {
    if token.is_empty() {
        return Err(AddressError::Empty);
    }
    if token.chars().any(char::is_whitespace) {
        return Err(AddressError::Whitespace(token.to_string()));
    }

    let parts: Vec<&str> = token.split(':').collect();
    match parts.as_slice() {
        [single] => {
            let side = parse_side(single)?;
            single_token_range(side).ok_or(AddressError::Empty)
        }
        [nw, se] => {
            let nw = parse_side(nw)?;
            let se = parse_side(se)?;
            let (start_row, end_row) = resolve_axis(nw.row, se.row);
            let (start_col, end_col) = resolve_axis(nw.col, se.col);
            Ok(CellRange { start_row, end_row, start_col, end_col })
        }
        _ => Err(AddressError::TooManyColons(token.to_string())),
    }
}

/// Convert column letters (case-insensitive, one or two) to a 0-based index.
pub fn letters_to_column(letters: &str) -> Result<usize, AddressError> {
    let upper = letters.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    if !bytes.iter().all(u8::is_ascii_uppercase) {
        return Err(AddressError::ColumnOutOfRange(letters.to_string()));
    }
    match *bytes {
        [l] => Ok((l - b'A') as usize),
        [l1, l2] => Ok((l1 - b'A') as usize * 26 + (l2 - b'A') as usize + 26),
        _ => Err(AddressError::ColumnOutOfRange(letters.to_string())),
    }
}

/// Convert a 0-based column index to letters. `None` beyond `ZZ`.
pub fn column_to_letters(col: usize) -> Option<String> {
    if col < 26 {
        Some(((b'A' + col as u8) as char).to_string())
    } else if col <= MAX_COLUMN {
        let rest = col - 26;
        let first = (b'A' + (rest / 26) as u8) as char;
        let second = (b'A' + (rest % 26) as u8) as char;
        Some(format!("{first}{second}"))
    } else {
        None
    }
}

/// Convert 1-based row digits to a 0-based index.
pub fn digits_to_row(digits: &str) -> Result<usize, AddressError> {
    if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::RowOutOfRange(digits.to_string()));
    }
    let n: usize = digits
        .parse()
        .map_err(|_| AddressError::RowOutOfRange(digits.to_string()))?;
    n.checked_sub(1)
        .ok_or_else(|| AddressError::RowOutOfRange(digits.to_string()))
}

/// Format a range without a sheet prefix.
pub fn format_range(range: &CellRange) -> Result<String, AddressError> {
    if range.is_empty() {
        return Err(AddressError::EmptyRange);
    }
    let out_of_range = || AddressError::OutOfRange { row: range.start_row, col: range.start_col };

    let letters = |col: usize| column_to_letters(col).ok_or_else(out_of_range);
    let row_number = |row: usize| {
        if row >= 1 && row <= MAX_ROW_NUMBER {
            Ok(row.to_string())
        } else {
            Err(out_of_range())
        }
    };

    // 1x1 finite ranges use the single-cell form.
    if range.height() == Some(1) && range.width() == Some(1) {
        return Ok(format!("{}{}", letters(range.start_col)?, row_number(range.start_row.saturating_add(1))?));
    }

    let rows_open = range.end_row.is_unbounded();
    let cols_open = range.end_col.is_unbounded();

    let nw_col = if cols_open && range.start_col == 0 && !rows_open {
        String::new()
    } else {
        letters(range.start_col)?
    };
    let nw_row = if rows_open && range.start_row == 0 && !cols_open {
        String::new()
    } else {
        row_number(range.start_row.saturating_add(1))?
    };
    let se_col = match range.end_col {
        Bound::At(end) => letters(end - 1)?,
        Bound::Unbounded => String::new(),
    };
    let se_row = match range.end_row {
        Bound::At(end) => row_number(end)?,
        Bound::Unbounded => String::new(),
    };

    Ok(format!("{nw_col}{nw_row}:{se_col}{se_row}"))
}

/// Format a range with an optional sheet prefix.
pub fn format_address(sheet: Option<&str>, range: &CellRange) -> Result<String, AddressError> {
    let body = format_range(range)?;
    Ok(match sheet {
        Some(title) => format!("{}!{}", quote_sheet_name(title), body),
        None => body,
    })
}

/// Quote a sheet title when it contains anything but ASCII alphanumerics
/// or `_`. Embedded quotes are doubled.
pub fn quote_sheet_name(title: &str) -> String {
    let plain = !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

/// Split `Sheet!Range` into the unescaped title and the range token.
fn split_sheet(text: &str) -> Result<(Option<String>, &str), AddressError> {
    if text.is_empty() {
        return Err(AddressError::Empty);
    }

    if let Some(quoted) = text.strip_prefix('\'') {
        let mut title = String::new();
        let mut chars = quoted.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            if ch != '\'' {
                title.push(ch);
                continue;
            }
            if let Some(&(_, '\'')) = chars.peek() {
                chars.next();
                title.push('\'');
                continue;
            }
            // Closing quote: the range must follow a single '!'.
            let rest = &quoted[idx + 1..];
            let token = rest
                .strip_prefix('!')
                .ok_or_else(|| AddressError::InvalidSheetName(text.to_string()))?;
            if title.is_empty() || token.contains('!') {
                return Err(AddressError::InvalidSheetName(text.to_string()));
            }
            return Ok((Some(title), token));
        }
        return Err(AddressError::UnterminatedQuote(text.to_string()));
    }

    match text.split_once('!') {
        None => Ok((None, text)),
        Some((title, token)) => {
            if title.contains('\'') {
                return Err(AddressError::UnterminatedQuote(text.to_string()));
            }
            let bad = title.is_empty() || title.chars().any(char::is_whitespace) || token.contains('!');
            if bad {
                return Err(AddressError::InvalidSheetName(text.to_string()));
            }
            Ok((Some(title.to_string()), token))
        }
    }
}

/// Decompose `Letters? Digits?`.
fn parse_side(token: &str) -> Result<Side, AddressError> {
    let mut letters = String::new();
    let mut digits = String::new();
    for ch in token.chars() {
        if ch.is_ascii_alphabetic() {
            if !digits.is_empty() {
                return Err(AddressError::DigitsBeforeLetters(token.to_string()));
            }
            letters.push(ch);
        } else if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            return Err(AddressError::InvalidCharacter { token: token.to_string(), ch });
        }
    }

    let col = if letters.is_empty() { None } else { Some(letters_to_column(&letters)?) };
    let row = if digits.is_empty() { None } else { Some(digits_to_row(&digits)?) };
    Ok(Side { row, col })
}

/// A token without a colon: a cell, a whole column or a whole row.
fn single_token_range(side: Side) -> Option<CellRange> {
    match (side.row, side.col) {
        (Some(row), Some(col)) => Some(CellRange::cell(row, col)),
        (None, Some(col)) => Some(CellRange {
            start_row: 0,
            end_row: Bound::Unbounded,
            start_col: col,
            end_col: Bound::At(col + 1),
        }),
        (Some(row), None) => Some(CellRange {
            start_row: row,
            end_row: Bound::At(row + 1),
            start_col: 0,
            end_col: Bound::Unbounded,
        }),
        (None, None) => None,
    }
}

/// Resolve one axis from the two corners' inclusive indices.
fn resolve_axis(nw: Option<usize>, se: Option<usize>) -> (usize, Bound) {
    match (nw, se) {
        (Some(a), Some(b)) => (a.min(b), Bound::At(a.max(b) + 1)),
        (Some(a), None) => (a, Bound::Unbounded),
        (None, Some(b)) => (0, Bound::At(b + 1)),
        (None, None) => (0, Bound::Unbounded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> CellRange {
        parse_range(text).unwrap()
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(letters_to_column("A").unwrap(), 0);
        assert_eq!(letters_to_column("B").unwrap(), 1);
        assert_eq!(letters_to_column("Z").unwrap(), 25);
        assert_eq!(letters_to_column("AA").unwrap(), 26);
        assert_eq!(letters_to_column("AB").unwrap(), 27);
        assert_eq!(letters_to_column("BA").unwrap(), 52);
        assert_eq!(letters_to_column("zz").unwrap(), MAX_COLUMN);
        assert!(matches!(letters_to_column("AAA"), Err(AddressError::ColumnOutOfRange(_))));
        assert!(matches!(letters_to_column(""), Err(AddressError::ColumnOutOfRange(_))));
    }

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(0).as_deref(), Some("A"));
        assert_eq!(column_to_letters(25).as_deref(), Some("Z"));
        assert_eq!(column_to_letters(26).as_deref(), Some("AA"));
        assert_eq!(column_to_letters(52).as_deref(), Some("BA"));
        assert_eq!(column_to_letters(MAX_COLUMN).as_deref(), Some("ZZ"));
        assert_eq!(column_to_letters(MAX_COLUMN + 1), None);
    }

    #[test]
    fn test_digits_to_row() {
        assert_eq!(digits_to_row("1").unwrap(), 0);
        assert_eq!(digits_to_row("99999").unwrap(), 99_998);
        assert!(digits_to_row("0").is_err());
        assert!(digits_to_row("").is_err());
        assert!(digits_to_row("100000").is_err());
    }

    #[test]
    fn test_corners() {
        // (text, corner, row, col)
        let cases = [
            ("b7", Corner::NorthWest, Bound::At(6), Bound::At(1)),
            ("b7", Corner::SouthEast, Bound::At(7), Bound::At(2)),
            ("b7:b9", Corner::NorthWest, Bound::At(6), Bound::At(1)),
            ("b7:b9", Corner::SouthEast, Bound::At(9), Bound::At(2)),
            ("b7:c9", Corner::SouthEast, Bound::At(9), Bound::At(3)),
            ("b7:c", Corner::NorthWest, Bound::At(6), Bound::At(1)),
            ("b7:c", Corner::SouthEast, Bound::Unbounded, Bound::At(3)),
            ("b7:", Corner::NorthWest, Bound::At(6), Bound::At(1)),
            ("b7:", Corner::SouthEast, Bound::Unbounded, Bound::Unbounded),
        ];
        for (text, corner, row, col) in cases {
            assert_eq!(parse_corner(text, corner).unwrap(), (row, col), "{text} {corner:?}");
        }
    }

    #[test]
    fn test_whole_rows_and_columns() {
        let rows = range("7:10");
        assert_eq!((rows.start_row, rows.end_row), (6, Bound::At(10)));
        assert_eq!((rows.start_col, rows.end_col), (0, Bound::Unbounded));

        let cols = range("B:E");
        assert_eq!((cols.start_row, cols.end_row), (0, Bound::Unbounded));
        assert_eq!((cols.start_col, cols.end_col), (1, Bound::At(5)));

        assert_eq!(range("A:A").end_row, Bound::Unbounded);
        assert_eq!(range("A:A").end_col, Bound::At(1));
        assert_eq!(range("1:1").end_col, Bound::Unbounded);
        assert_eq!(range("1:1").end_row, Bound::At(1));
    }

    #[test]
    fn test_single_partial_tokens() {
        assert_eq!(range("C"), range("C:C"));
        assert_eq!(range("7"), range("7:7"));
        assert_eq!(range("C3"), CellRange::cell(2, 2));
    }

    #[test]
    fn test_reversed_and_case() {
        assert_eq!(range("B2:A1"), range("A1:B2"));
        assert_eq!(range("A2:B1"), range("A1:B2"));
        assert_eq!(range("a1:b2"), range("A1:B2"));
        assert_eq!(range("E:B"), range("B:E"));
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(parse_range("A1:B2:C3"), Err(AddressError::TooManyColons(_))));
        assert!(matches!(parse_range(" A1"), Err(AddressError::Whitespace(_))));
        assert!(matches!(parse_range("A1 :B2"), Err(AddressError::Whitespace(_))));
        assert!(matches!(parse_range("A1:B2 "), Err(AddressError::Whitespace(_))));
        assert!(matches!(parse_range("7B"), Err(AddressError::DigitsBeforeLetters(_))));
        assert!(matches!(parse_range("A-1"), Err(AddressError::InvalidCharacter { ch: '-', .. })));
        assert!(matches!(parse_range("AAA1"), Err(AddressError::ColumnOutOfRange(_))));
        assert!(matches!(parse_range("A0"), Err(AddressError::RowOutOfRange(_))));
        assert!(matches!(parse_range("A123456"), Err(AddressError::RowOutOfRange(_))));
        assert!(matches!(parse_range(""), Err(AddressError::Empty)));
    }

    #[test]
    fn test_sheet_prefix() {
        let r = parse_a1("Config!J5:K6").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("Config"));
        assert_eq!(r.range, CellRange::with_size(4, 9, 2, 2));

        let r = parse_a1("'My Sheet'!A1").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("My Sheet"));

        let r = parse_a1("'Bob''s Data'!A1:B2").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("Bob's Data"));

        let r = parse_a1("'a!b'!C3").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("a!b"));

        assert_eq!(parse_a1("A1:B2").unwrap().sheet, None);
    }

    #[test]
    fn test_sheet_prefix_errors() {
        assert!(matches!(parse_a1("'My Sheet!A1"), Err(AddressError::UnterminatedQuote(_))));
        assert!(matches!(parse_a1("Sheet'!A1"), Err(AddressError::UnterminatedQuote(_))));
        assert!(matches!(parse_a1("My Sheet!A1"), Err(AddressError::InvalidSheetName(_))));
        assert!(matches!(parse_a1("!A1"), Err(AddressError::InvalidSheetName(_))));
        assert!(matches!(parse_a1("''!A1"), Err(AddressError::InvalidSheetName(_))));
        assert!(matches!(parse_a1("'Sheet'A1"), Err(AddressError::InvalidSheetName(_))));
        assert!(matches!(parse_a1("a!b!A1"), Err(AddressError::InvalidSheetName(_))));
    }

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(&range("B6:J10")).unwrap(), "B6:J10");
        assert_eq!(format_range(&CellRange::cell(2, 2)).unwrap(), "C3");
        assert_eq!(format_range(&range("5:10")).unwrap(), "5:10");
        assert_eq!(format_range(&range("A:E")).unwrap(), "A:E");
        assert_eq!(format_range(&range("B5:E")).unwrap(), "B5:E");
        assert_eq!(format_range(&range("C7:")).unwrap(), "C7:");
        assert_eq!(format_range(&range("A1:")).unwrap(), "A1:");
        assert_eq!(format_range(&range("AA100:ZZ200")).unwrap(), "AA100:ZZ200");
    }

    #[test]
    fn test_format_open_forms_reparse() {
        for text in ["5:10", "A:E", "B5:E", "C7:", "A1:", "C:C", "7:7"] {
            let r = range(text);
            assert_eq!(range(&format_range(&r).unwrap()), r, "{text}");
        }
    }

    #[test]
    fn test_format_rejects_unrepresentable() {
        assert_eq!(format_range(&CellRange::empty()), Err(AddressError::EmptyRange));
        let wide = CellRange::with_size(0, MAX_COLUMN, 1, 2);
        assert!(matches!(format_range(&wide), Err(AddressError::OutOfRange { .. })));
        let tall = CellRange::with_size(MAX_ROW_NUMBER - 1, 0, 2, 1);
        assert!(matches!(format_range(&tall), Err(AddressError::OutOfRange { .. })));
        let far = CellRange::new(usize::MAX, Bound::Unbounded, 0, Bound::At(1));
        assert!(matches!(format_range(&far), Err(AddressError::OutOfRange { .. })));
    }

    #[test]
    fn test_format_address_quotes() {
        let r = CellRange::with_size(0, 0, 2, 2);
        assert_eq!(format_address(Some("Config"), &r).unwrap(), "Config!A1:B2");
        assert_eq!(format_address(Some("My Sheet"), &r).unwrap(), "'My Sheet'!A1:B2");
        assert_eq!(format_address(Some("Bob's"), &r).unwrap(), "'Bob''s'!A1:B2");
        assert_eq!(format_address(None, &r).unwrap(), "A1:B2");

        let back = parse_a1("'Bob''s'!A1:B2").unwrap();
        assert_eq!(back.sheet.as_deref(), Some("Bob's"));
        assert_eq!(back.range, r);
    }
}
