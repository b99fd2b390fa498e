use std::fmt;

/// Malformed symbolic address, or a range that has no symbolic form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Nothing to parse after the sheet prefix.
    Empty,
    /// Whitespace is never valid inside an address token.
    Whitespace(String),
    /// More than one `:` in the range part.
    TooManyColons(String),
    /// A character that is neither a letter nor a digit.
    InvalidCharacter { token: String, ch: char },
    /// Row digits followed by column letters (`7B`).
    DigitsBeforeLetters(String),
    /// More than two column letters.
    ColumnOutOfRange(String),
    /// Row digits empty, longer than five characters, or zero.
    RowOutOfRange(String),
    /// Quoted sheet name without its closing quote.
    UnterminatedQuote(String),
    /// Sheet name empty, unquoted with spaces, or with a stray `!`.
    InvalidSheetName(String),
    /// A finite range was required.
    Unbounded(String),
    /// Zero rows or zero columns; such a range has no A1 form.
    EmptyRange,
    /// Index or size cannot be written in A1 notation.
    OutOfRange { row: usize, col: usize },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty address"),
            Self::Whitespace(s) => write!(f, "whitespace in address '{s}'"),
            Self::TooManyColons(s) => write!(f, "more than one ':' in '{s}'"),
            Self::InvalidCharacter { token, ch } => {
                write!(f, "invalid character '{ch}' in '{token}'")
            }
            Self::DigitsBeforeLetters(s) => write!(f, "row digits before column letters in '{s}'"),
            Self::ColumnOutOfRange(s) => write!(f, "column '{s}' out of range (A..ZZ)"),
            Self::RowOutOfRange(s) => write!(f, "row '{s}' out of range (1..99999)"),
            Self::UnterminatedQuote(s) => write!(f, "unterminated quote in sheet name '{s}'"),
            Self::InvalidSheetName(s) => write!(f, "invalid sheet name '{s}'"),
            Self::Unbounded(s) => write!(f, "range '{s}' is not finite"),
            Self::EmptyRange => write!(f, "range has no cells"),
            Self::OutOfRange { row, col } => {
                write!(f, "row {row}, column {col} cannot be written in A1 notation")
            }
        }
    }
}

impl std::error::Error for AddressError {}
