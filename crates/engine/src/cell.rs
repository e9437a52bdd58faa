use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// 2^53: above this not every integer has an f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single cell as read from a tabular source.
///
/// Readers decide the variant; the matcher never looks at the variant directly,
/// it goes through the normalizer in `sheetmerge-merge`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Interpret raw text the way a delimited-file reader does: blank is empty,
    /// a number whose rendering reproduces the input exactly is numeric, the
    /// rest is text. `007`, `1e5` and IDs beyond f64 precision stay text.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() && num.abs() < MAX_EXACT_INT && Self::format_number(num) == trimmed {
                return CellValue::Number(num);
            }
        }

        CellValue::Text(input.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Textual rendering used by writers and by generic normalization.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => Self::format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            CellValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }

    /// Integers without decimals, everything else in shortest round-trip form.
    pub fn format_number(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}
