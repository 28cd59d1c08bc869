//! Shared helpers: date reformatting, timed phases, interrupt handling

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::NaiveDate;
use console::{style, StyledObject};

use crate::error::{PipelineError, PipelineResult, TransformError, TransformResult};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Reformat an FDC `MM/DD/YYYY` date as `YYYY-MM-DD`
pub fn mdy_to_ymd(date: &str) -> TransformResult<String> {
    NaiveDate::parse_from_str(date.trim(), "%m/%d/%Y")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| TransformError::InvalidDate(date.to_string()))
}

/// Route Ctrl-C into a flag that long-running loops poll
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
    })
}

pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Fail with [`PipelineError::Interrupted`] once Ctrl-C has been pressed
pub fn check_interrupt() -> PipelineResult<()> {
    if interrupted() {
        Err(PipelineError::Interrupted)
    } else {
        Ok(())
    }
}

/// Copy `reader` into `writer`, stopping early on Ctrl-C.
///
/// Returns `Ok(None)` when interrupted, otherwise the number of bytes copied.
pub fn copy_interruptible<R, W>(reader: &mut R, writer: &mut W) -> io::Result<Option<u64>>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        if interrupted() {
            return Ok(None);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(Some(total)),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
}

/// Coloured end-of-phase marker: green timing, red `aborted` or `failed`
fn phase_marker<T>(result: &PipelineResult<T>, secs: f64) -> StyledObject<String> {
    let marker = match result {
        Ok(_) => style(format!("({:.2} secs)", secs)).green(),
        Err(e) if e.is_interrupted() => style("aborted".to_string()).red(),
        Err(_) => style("failed".to_string()).red(),
    };
    marker.for_stderr()
}

/// Run one pipeline phase, reporting its duration or how it ended.
///
/// Prints `<title> ` followed by `(x.xx secs)`, `aborted` or `failed`.
pub fn measure<T, F>(title: &str, phase: F) -> PipelineResult<T>
where
    F: FnOnce() -> PipelineResult<T>,
{
    let start = Instant::now();
    eprint!("{} ", title);
    let _ = std::io::stderr().flush();

    let result = phase();
    let secs = start.elapsed().as_secs_f64();
    eprintln!("{}", phase_marker(&result, secs));

    match &result {
        Ok(_) => tracing::info!(phase = title, secs, "phase finished"),
        Err(e) if e.is_interrupted() => tracing::warn!(phase = title, secs, "phase aborted"),
        Err(e) => tracing::error!(phase = title, secs, error = %e, "phase failed"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mdy_to_ymd() {
        assert_eq!(mdy_to_ymd("01/02/2020").unwrap(), "2020-01-02");
        assert_eq!(mdy_to_ymd("12/31/1999").unwrap(), "1999-12-31");
        assert_eq!(mdy_to_ymd("4/1/2019").unwrap(), "2019-04-01");
    }

    #[test]
    fn test_mdy_to_ymd_rejects_other_formats() {
        assert!(matches!(
            mdy_to_ymd("2020-01-02"),
            Err(TransformError::InvalidDate(_))
        ));
        assert!(mdy_to_ymd("13/01/2020").is_err());
        assert!(mdy_to_ymd("").is_err());
    }

    #[test]
    fn test_copy_interruptible() {
        let data = vec![7u8; 200_000];
        let mut out = Vec::new();
        let copied = copy_interruptible(&mut data.as_slice(), &mut out).unwrap();
        assert_eq!(copied, Some(200_000));
        assert_eq!(out, data);
    }

    #[test]
    fn test_phase_marker_text_and_colour() {
        let ok: PipelineResult<()> = Ok(());
        let marker = phase_marker(&ok, 1.5).force_styling(true).to_string();
        assert!(marker.contains("\x1b[32m"));
        assert_eq!(console::strip_ansi_codes(&marker), "(1.50 secs)");

        let aborted: PipelineResult<()> = Err(PipelineError::Interrupted);
        let marker = phase_marker(&aborted, 0.0).force_styling(true).to_string();
        assert!(marker.contains("\x1b[31m"));
        assert_eq!(console::strip_ansi_codes(&marker), "aborted");

        let failed: PipelineResult<()> = Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::Other,
            "boom",
        )));
        let marker = phase_marker(&failed, 0.0).force_styling(true).to_string();
        assert!(marker.contains("\x1b[31m"));
        assert_eq!(console::strip_ansi_codes(&marker), "failed");
    }

    #[test]
    fn test_measure_passes_result_through() {
        let ok: PipelineResult<u32> = measure("testing ok", || Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: PipelineResult<()> = measure("testing abort", || Err(PipelineError::Interrupted));
        assert!(err.unwrap_err().is_interrupted());
    }
}
