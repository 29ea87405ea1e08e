//! Spreadsheet input: first worksheet, row 1 as headers, 1-based row numbers.

use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::Error;

/// Excel column reference by letters (`A`, `I`, `AA`), stored zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef(usize);

impl ColumnRef {
    /// Zero-based column index (`A` is 0).
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Default for ColumnRef {
    /// Column `I`, where merged OCLC numbers live in the standard export.
    fn default() -> Self {
        Self(8)
    }
}

impl FromStr for ColumnRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letters = s.trim();
        if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(Error::Config(format!("invalid column {s:?}: expected letters like I or AA")));
        }
        let mut index = 0usize;
        for b in letters.bytes() {
            let digit = usize::from(b.to_ascii_uppercase() - b'A') + 1;
            index = index
                .checked_mul(26)
                .and_then(|i| i.checked_add(digit))
                .ok_or_else(|| Error::Config(format!("column {s:?} is out of range")))?;
        }
        Ok(Self(index - 1))
    }
}

/// One worksheet row with its cells rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based row number as shown in the spreadsheet.
    pub number: u32,
    pub cells: Vec<String>,
}

impl SheetRow {
    #[must_use]
    pub fn new(number: u32, cells: Vec<String>) -> Self {
        Self { number, cells }
    }

    /// Non-blank cell value at `column`.
    #[must_use]
    pub fn cell(&self, column: ColumnRef) -> Option<&str> {
        self.cells
            .get(column.index())
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worksheet {
    pub headers: Vec<String>,
    /// Data rows (row 2 onwards) in sheet order.
    pub rows: Vec<SheetRow>,
}

impl Worksheet {
    /// Read the first worksheet of an xlsx/xls/xlsb/ods workbook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spreadsheet`] if the file cannot be opened or has no worksheets.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| Error::Spreadsheet(format!("open {}: {e}", path.display())))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::Spreadsheet(format!("{} has no worksheets", path.display())))?
            .map_err(|e| Error::Spreadsheet(format!("read first worksheet: {e}")))?;
        Ok(Self::from_range(&range))
    }

    /// Build from a calamine range, keeping absolute row numbers and column letters.
    #[must_use]
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };
        let padding = start_col as usize;

        let mut sheet = Self::default();
        for (offset, cells) in range.rows().enumerate() {
            let number = start_row + offset as u32 + 1;
            let cells: Vec<String> = std::iter::repeat(String::new())
                .take(padding)
                .chain(cells.iter().map(render_cell))
                .collect();
            if number == 1 {
                sheet.headers = cells;
            } else {
                sheet.rows.push(SheetRow::new(number, cells));
            }
        }
        sheet
    }
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
