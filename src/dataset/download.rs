//! Archive download

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use super::scratch::{partial_path, ScratchFile};
use crate::error::{PipelineError, PipelineResult};
use crate::utils::copy_interruptible;

/// Build the HTTP client used for archive downloads.
///
/// Archives run to hundreds of megabytes, so only connecting is time-limited.
pub fn http_client() -> PipelineResult<Client> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(None::<Duration>)
        .user_agent(concat!("foodprep/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// `dest` only appears once the whole body has been received.
pub fn download_to(client: &Client, url: &str, dest: &Path) -> PipelineResult<u64> {
    tracing::debug!(url, dest = %dest.display(), "starting download");

    let mut response = client.get(url).send()?.error_for_status()?;
    let partial = ScratchFile::new(partial_path(dest));

    let bytes = {
        let mut out = BufWriter::new(File::create(partial.path())?);
        let bytes =
            copy_interruptible(&mut response, &mut out)?.ok_or(PipelineError::Interrupted)?;
        out.flush()?;
        bytes
    };
    fs::rename(partial.path(), dest)?;

    tracing::info!(url, bytes, "download complete");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_builds() {
        assert!(http_client().is_ok());
    }

    #[test]
    fn test_unreachable_host_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foundation.zip");
        let client = http_client().unwrap();

        // Port 9 on loopback is discard; nothing listens there in test environments
        let result = download_to(&client, "http://127.0.0.1:9/archive.zip", &dest);

        assert!(matches!(result, Err(PipelineError::Download(_))));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
