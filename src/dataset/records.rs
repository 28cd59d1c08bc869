//! Lazy ingredient stream over an NDJSON scratch file

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::error::Category;

use crate::error::{PipelineError, PipelineResult};
use crate::fdc::FoodItem;
use crate::models::Ingredient;
use crate::utils::interrupted;

/// Iterator yielding one [`Ingredient`] per usable input line.
///
/// Records with missing or mistyped fields are logged and skipped. Any other
/// failure is yielded once and ends the stream.
pub struct Ingredients<R> {
    reader: R,
    dataset: &'static str,
    line_no: usize,
    skipped: usize,
    finished: bool,
    buf: String,
}

impl Ingredients<BufReader<File>> {
    pub fn open(path: &Path, dataset: &'static str) -> PipelineResult<Self> {
        Ok(Self::from_reader(BufReader::new(File::open(path)?), dataset))
    }
}

impl<R: BufRead> Ingredients<R> {
    pub fn from_reader(reader: R, dataset: &'static str) -> Self {
        Self {
            reader,
            dataset,
            line_no: 0,
            skipped: 0,
            finished: false,
            buf: String::new(),
        }
    }

    /// Number of records skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn fail(&mut self, err: PipelineError) -> Option<PipelineResult<Ingredient>> {
        self.finished = true;
        Some(Err(err))
    }

    fn skip(&mut self, reason: &dyn std::fmt::Display) {
        self.skipped += 1;
        tracing::warn!(
            dataset = self.dataset,
            line = self.line_no,
            reason = %reason,
            "skipping record"
        );
    }
}

impl<R: BufRead> Iterator for Ingredients<R> {
    type Item = PipelineResult<Ingredient>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if interrupted() {
                return self.fail(PipelineError::Interrupted);
            }

            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => self.line_no += 1,
                Err(e) => return self.fail(e.into()),
            }

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            let item: FoodItem = match serde_json::from_str(line) {
                Ok(item) => item,
                Err(e) if e.classify() == Category::Data => {
                    self.skip(&e);
                    continue;
                }
                Err(source) => {
                    let line = self.line_no;
                    return self.fail(PipelineError::Json { line, source });
                }
            };

            match Ingredient::from_fdc(&item) {
                Ok(ingredient) => return Some(Ok(ingredient)),
                Err(e) if e.is_recoverable() => self.skip(&e),
                Err(source) => {
                    let line = self.line_no;
                    return self.fail(PipelineError::Transform { line, source });
                }
            }
        }
        None
    }
}
