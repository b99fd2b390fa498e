use serde::{Deserialize, Serialize};
use sheetdb_protocol::{CellData, Color, ExtendedValue};

/// Currency symbols accepted (once) in front of a numeric value.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// How an entered string will be stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Blank,
    Number(f64),
    Text,
}

impl ValueKind {
    /// Classify user input.
    ///
    /// Numeric means: after one optional leading currency symbol, a
    /// non-empty run of digits with at most one `.` and at least one digit.
    /// Signs and exponents are text.
    pub fn classify(input: &str) -> Self {
        if input.is_empty() {
            return ValueKind::Blank;
        }

        let body = input.strip_prefix(&CURRENCY_SYMBOLS[..]).unwrap_or(input);
        let digits = body.bytes().filter(u8::is_ascii_digit).count();
        let dots = body.bytes().filter(|&b| b == b'.').count();
        let numeric = !body.is_empty() && digits > 0 && dots <= 1 && digits + dots == body.len();

        if numeric {
            if let Ok(n) = body.parse::<f64>() {
                return ValueKind::Number(n);
            }
        }
        ValueKind::Text
    }
}

/// Shortest display form of a number (`10`, `1.5`).
pub fn format_number(n: f64) -> String {
    format!("{}", n)
}

/// Raw value as the user entered it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn from_input(input: &str) -> Self {
        match ValueKind::classify(input) {
            ValueKind::Blank => CellValue::Empty,
            ValueKind::Number(n) => CellValue::Number(n),
            ValueKind::Text => CellValue::Text(input.to_string()),
        }
    }

    pub fn raw_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }

    fn from_extended(value: &ExtendedValue) -> Self {
        match value {
            ExtendedValue::Blank => CellValue::Empty,
            ExtendedValue::Number(n) => CellValue::Number(*n),
            ExtendedValue::Text(s) => CellValue::Text(s.clone()),
        }
    }

    fn to_extended(&self) -> ExtendedValue {
        match self {
            CellValue::Empty => ExtendedValue::Blank,
            CellValue::Number(n) => ExtendedValue::Number(*n),
            CellValue::Text(s) => ExtendedValue::Text(s.clone()),
        }
    }
}

/// One mirrored cell: the entered value plus the service's rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    value: CellValue,
    display: String,
    background: Option<Color>,
}

impl Cell {
    /// A cell whose display is the raw rendering of `value`.
    pub fn new(value: CellValue) -> Self {
        let display = value.raw_display();
        Self { value, display, background: None }
    }

    pub fn from_input(input: &str) -> Self {
        Self::new(CellValue::from_input(input))
    }

    /// A cell as read back from the service: `display` is authoritative.
    pub fn rendered(display: &str, background: Option<Color>) -> Self {
        Self {
            value: CellValue::from_input(display),
            display: display.to_string(),
            background,
        }
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Display string. A non-empty entered text wins over the service's
    /// formatted rendering.
    pub fn display(&self) -> &str {
        match &self.value {
            CellValue::Text(s) if !s.is_empty() => s,
            _ => &self.display,
        }
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn is_blank(&self) -> bool {
        self.display().is_empty()
    }

    /// Truthy text: `yes`, `true` or `1`, case-insensitive.
    pub fn affirm(&self) -> bool {
        let text = self.display().trim();
        ["yes", "true", "1"].iter().any(|t| text.eq_ignore_ascii_case(t))
    }

    pub fn from_data(data: &CellData) -> Self {
        let value = CellValue::from_extended(&data.value);
        let display = data.formatted.clone().unwrap_or_else(|| value.raw_display());
        Self { value, display, background: data.background }
    }

    pub fn to_data(&self) -> CellData {
        CellData {
            value: self.value.to_extended(),
            formatted: Some(self.display.clone()).filter(|s| !s.is_empty()),
            background: self.background,
        }
    }
}

/// Write payload for one entered string, marked with `highlight`.
pub fn write_payload(input: &str, highlight: Color) -> CellData {
    let (value, formatted) = match ValueKind::classify(input) {
        ValueKind::Blank => (ExtendedValue::Blank, None),
        ValueKind::Number(n) => (ExtendedValue::Number(n), Some(format_number(n))),
        ValueKind::Text => (ExtendedValue::Text(input.to_string()), Some(input.to_string())),
    };
    CellData { value, formatted, background: Some(highlight) }
}
