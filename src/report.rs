use std::io::Write;

use crate::error::Error;
use crate::hand::HandReport;

/// Writes one JSON object per processed frame.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(&mut self, report: &HandReport) -> Result<(), Error> {
        serde_json::to_writer(&mut self.out, report)?;
        self.out.write_all(b"\n")?;

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
