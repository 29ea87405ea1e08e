use std::io::Write;

use crate::error::Error;
use crate::summary::BestHolding;

/// Column names appended after the spreadsheet's own headers.
pub const DERIVED_HEADERS: [&str; 3] = [
    "OCLC Number",
    "Count of Libraries",
    "Count of libraries summary",
];

/// CSV writer for augmented rows. Every record is flushed as it is written.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new().flexible(true).from_writer(inner);
        Self { writer }
    }

    /// # Errors
    ///
    /// Returns [`Error::Csv`] if the record cannot be written.
    pub fn write_header(&mut self, headers: &[String]) -> Result<(), Error> {
        let record = headers
            .iter()
            .map(String::as_str)
            .chain(DERIVED_HEADERS);
        self.writer.write_record(record)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write the original cells followed by the best match, or three empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] if the record cannot be written.
    pub fn write_row(&mut self, cells: &[String], best: Option<&BestHolding>) -> Result<(), Error> {
        let derived = match best {
            Some(best) => [
                best.oclc_number.to_string(),
                best.library_count.to_string(),
                best.summary.to_string(),
            ],
            None => Default::default(),
        };
        let record = cells.iter().chain(derived.iter());
        self.writer.write_record(record)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the final flush fails.
    pub fn into_inner(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}
