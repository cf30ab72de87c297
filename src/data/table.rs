use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ColumnError;

/// Cell texts read as missing unless a source lists its own markers.
/// The usual spreadsheet and dataframe spellings of "no value".
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn default_na_values() -> Vec<String> {
    DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Cell – one value of a loaded sheet, before numeric conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Header text for this cell (numbers are formatted, empty → "").
    pub fn to_header(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Numeric value of the cell. Missing markers and empty cells are NaN,
    /// any other text must parse as a float.
    fn to_f64(&self, na_values: &[String]) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Empty => Some(f64::NAN),
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() || na_values.iter().any(|na| na == s) {
                    Some(f64::NAN)
                } else {
                    s.parse::<f64>().ok()
                }
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Empty => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnSelector – by spreadsheet letter or by header name
// ---------------------------------------------------------------------------

/// How a column is picked out of a sheet.
///
/// JSON: `{"letter": "F"}` or `{"name": "Core Pos. (cm)"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelector {
    Letter(String),
    Name(String),
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Letter(l) => write!(f, "{l}"),
            ColumnSelector::Name(n) => write!(f, "'{n}'"),
        }
    }
}

/// Zero-based index of a spreadsheet column letter: `A` → 0, `Z` → 25,
/// `AA` → 26. Case-insensitive.
pub fn column_letter_index(letter: &str) -> Option<usize> {
    let letter = letter.trim();
    if letter.is_empty() {
        return None;
    }
    let mut index: usize = 0;
    for ch in letter.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

// ---------------------------------------------------------------------------
// RawTable – header row + data rows, format independent
// ---------------------------------------------------------------------------

/// A sheet as read from disk: the first row is the header, the rest are
/// data rows. Rows may be ragged; absent cells read as empty.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Resolve a selector to a column index.
    pub fn column_index(&self, selector: &ColumnSelector) -> Result<usize, ColumnError> {
        match selector {
            ColumnSelector::Letter(l) => {
                let idx = column_letter_index(l)
                    .ok_or_else(|| ColumnError::InvalidLetter(l.clone()))?;
                if idx < self.width() {
                    Ok(idx)
                } else {
                    Err(ColumnError::NotFound(selector.to_string()))
                }
            }
            ColumnSelector::Name(n) => self
                .headers
                .iter()
                .position(|h| h == n.trim())
                .ok_or_else(|| ColumnError::NotFound(selector.to_string())),
        }
    }

    /// Read one column as floats. `na_values`, empty and absent cells → NaN.
    pub fn numeric_column(
        &self,
        selector: &ColumnSelector,
        na_values: &[String],
    ) -> Result<Vec<f64>, ColumnError> {
        let idx = self.column_index(selector)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = cells.get(idx).unwrap_or(&Cell::Empty);
                cell.to_f64(na_values).ok_or_else(|| ColumnError::NotNumeric {
                    column: selector.to_string(),
                    // 1-based, counting the header row, as a spreadsheet shows it
                    row: row + 2,
                    value: cell.to_string(),
                })
            })
            .collect()
    }
}
