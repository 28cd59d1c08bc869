//! Streaming array-to-lines extraction
//!
//! FDC archives contain one pretty-printed JSON array per dataset, with the
//! opening `[` on the first line, one element per line, and the closing `]`
//! on the last line. Extraction keeps every line in between, minus its
//! trailing comma, without ever holding more than one line in memory.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::IgnoredAny;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use super::scratch::{partial_path, ScratchFile};
use crate::utils::{copy_interruptible, interrupted};

/// Extraction error types
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] ZipError),

    #[error("archive {archive} has no member named {member}")]
    MemberNotFound { archive: PathBuf, member: String },

    #[error("{path} has {lines} line(s), too few for a JSON array")]
    TooShort { path: PathBuf, lines: usize },

    #[error("line {line} of {path} is not a JSON value: {source}")]
    CorruptLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("extraction interrupted")]
    Interrupted,
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Count lines in a single pass; a final line without `\n` still counts
pub fn count_lines<R: BufRead>(mut reader: R) -> io::Result<usize> {
    let mut count = 0;
    let mut last = None;
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if buf.is_empty() {
            break;
        }
        count += buf.iter().filter(|&&b| b == b'\n').count();
        last = buf.last().copied();
        let len = buf.len();
        reader.consume(len);
    }
    if matches!(last, Some(b) if b != b'\n') {
        count += 1;
    }
    Ok(count)
}

/// Trim one array element line down to its JSON text
pub fn strip_element(line: &str) -> &str {
    let line = line.trim();
    line.strip_suffix(',').unwrap_or(line).trim_end()
}

/// Lazy iterator over the element lines of a one-element-per-line array.
///
/// Yields `(line number, element)` with 1-based source line numbers, skipping
/// the first and last lines.
pub struct ArrayLines<R> {
    reader: R,
    index: usize,
    footer: usize,
}

impl<R: BufRead> ArrayLines<R> {
    /// `line_count` must come from a prior [`count_lines`] over the same content
    pub fn new(reader: R, line_count: usize) -> Self {
        Self {
            reader,
            index: 0,
            footer: line_count.saturating_sub(1),
        }
    }
}

impl<R: BufRead> Iterator for ArrayLines<R> {
    type Item = io::Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            if self.index >= self.footer {
                return None;
            }
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            let index = self.index;
            self.index += 1;
            if index == 0 {
                continue;
            }
            return Some(Ok((index + 1, strip_element(&line).to_string())));
        }
    }
}

/// Write each array element as one NDJSON line, validating it as JSON.
///
/// `origin` is only used in error messages. Returns the number of records.
pub fn write_array_lines<R, W>(
    reader: R,
    line_count: usize,
    mut writer: W,
    origin: &Path,
) -> ExtractResult<usize>
where
    R: BufRead,
    W: Write,
{
    let mut written = 0;
    for entry in ArrayLines::new(reader, line_count) {
        if interrupted() {
            return Err(ExtractError::Interrupted);
        }
        let (line, element) = entry?;
        serde_json::from_str::<IgnoredAny>(&element).map_err(|source| {
            ExtractError::CorruptLine {
                path: origin.to_path_buf(),
                line,
                source,
            }
        })?;
        writer.write_all(element.as_bytes())?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Convert a raw JSON array file into an NDJSON file.
///
/// The output appears atomically: it is written to a `.partial` sibling and
/// renamed only once every line has been validated.
pub fn extract_file(raw_json: &Path, output: &Path) -> ExtractResult<usize> {
    let line_count = count_lines(BufReader::new(File::open(raw_json)?))?;
    if line_count < 2 {
        return Err(ExtractError::TooShort {
            path: raw_json.to_path_buf(),
            lines: line_count,
        });
    }

    let partial = ScratchFile::new(partial_path(output));
    let written = write_array_lines(
        BufReader::new(File::open(raw_json)?),
        line_count,
        BufWriter::new(File::create(partial.path())?),
        raw_json,
    )?;
    fs::rename(partial.path(), output)?;

    Ok(written)
}

/// Extract `member` from a zip archive into `scratch_dir`, convert it to
/// NDJSON at `output`, and delete the raw member file.
pub fn extract_member(
    archive: &Path,
    member: &str,
    scratch_dir: &Path,
    output: &Path,
) -> ExtractResult<usize> {
    let raw = ScratchFile::new(scratch_dir.join(member));

    {
        let mut zip = ZipArchive::new(File::open(archive)?)?;
        let mut entry = match zip.by_name(member) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(ExtractError::MemberNotFound {
                    archive: archive.to_path_buf(),
                    member: member.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut out = BufWriter::new(File::create(raw.path())?);
        let bytes = copy_interruptible(&mut entry, &mut out)?.ok_or(ExtractError::Interrupted)?;
        out.flush()?;
        tracing::debug!(member, bytes, "unpacked archive member");
    }

    extract_file(raw.path(), output)
}
