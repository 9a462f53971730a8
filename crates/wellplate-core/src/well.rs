use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GridError;

pub const ROWS: usize = 8;
pub const COLUMNS: usize = 12;
pub const WELL_COUNT: usize = ROWS * COLUMNS;

const ROW_LETTERS: [char; ROWS] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// One addressable position on a 96-well plate.
///
/// `row` is zero-based (A = 0 .. H = 7) and `column` is one-based (1 ..= 12),
/// matching how wells are written ("A01" .. "H12").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WellId {
    row: u8,
    column: u8,
}

impl WellId {
    pub fn new(row: usize, column: usize) -> Result<Self, GridError> {
        if row >= ROWS || column == 0 || column > COLUMNS {
            return Err(GridError::InvalidWell {
                id: format!("row {row}, column {column}"),
            });
        }
        Ok(Self {
            row: row as u8,
            column: column as u8,
        })
    }

    #[must_use]
    pub fn row(self) -> usize {
        self.row as usize
    }

    #[must_use]
    pub fn column(self) -> usize {
        self.column as usize
    }

    #[must_use]
    pub fn row_letter(self) -> char {
        ROW_LETTERS[self.row()]
    }

    /// Row-major slot index (A01 = 0, A02 = 1, .., H12 = 95).
    #[must_use]
    pub fn index(self) -> usize {
        self.row() * COLUMNS + (self.column() - 1)
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            row: (index / COLUMNS) as u8,
            column: (index % COLUMNS + 1) as u8,
        }
    }

    /// All 96 wells in row-major order (A01, A02, .., A12, B01, ..).
    pub fn row_major() -> impl Iterator<Item = WellId> {
        (0..WELL_COUNT).map(Self::from_index)
    }

    /// All 96 wells in column-major order (A01, B01, .., H01, A02, ..).
    pub fn column_major() -> impl Iterator<Item = WellId> {
        (1..=COLUMNS).flat_map(|column| {
            (0..ROWS).map(move |row| Self {
                row: row as u8,
                column: column as u8,
            })
        })
    }

    /// Wells of a single column, top to bottom.
    pub fn column_wells(column: usize) -> impl Iterator<Item = WellId> {
        let valid = (1..=COLUMNS).contains(&column);
        (0..ROWS).filter(move |_| valid).map(move |row| Self {
            row: row as u8,
            column: column as u8,
        })
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.row_letter(), self.column)
    }
}

impl FromStr for WellId {
    type Err = GridError;

    /// Accepts "A01", "A1" and lower-case row letters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidWell { id: s.to_string() };
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let row = ROW_LETTERS
            .iter()
            .position(|c| *c == letter)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let column: usize = digits.parse().map_err(|_| invalid())?;
        Self::new(row, column).map_err(|_| invalid())
    }
}

impl TryFrom<String> for WellId {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WellId> for String {
    fn from(value: WellId) -> Self {
        value.to_string()
    }
}
