use std::{
    io::{BufRead, BufReader, Read},
    path::PathBuf,
    process::{Command, ExitStatus, Stdio},
    thread,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    options::DownloadOptions,
    progress::{PROGRESS_PREFIX, parse_progress_from_line},
};

/// Failure reported by the media downloader, carried as an opaque message
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DownloadError(pub String);

/// The external media-download collaborator.
///
/// `download` blocks until the media is written or the attempt fails, and
/// reports progress fractions through `progress` as it goes.
pub trait MediaDownloader: Send + Sync {
    fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &dyn Fn(f32),
    ) -> Result<(), DownloadError>;
}

/// Runs the `yt-dlp` executable
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    fn args(url: &str, options: &DownloadOptions) -> Vec<String> {
        let mut args = options.to_args();
        args.push("--newline".to_owned());
        args.push("--progress-template".to_owned());
        args.push(format!("{PROGRESS_PREFIX}%(progress._percent_str)s"));
        args.push("--".to_owned());
        args.push(url.to_owned());
        args
    }
}

impl MediaDownloader for YtDlp {
    fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &dyn Fn(f32),
    ) -> Result<(), DownloadError> {
        let mut child = Command::new(&self.binary)
            .args(Self::args(url, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DownloadError(format!("could not start {}: {e}", self.binary.display()))
            })?;

        // Drain stderr on its own thread so a chatty child can't fill the pipe.
        // yt-dlp writes in the console's code page, so decode lossily.
        let stderr = child.stderr.take().map(|mut err| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = err.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        if let Some(out) = child.stdout.take() {
            let mut reader = BufReader::new(out);
            let mut buf = Vec::new();
            // Keep reading to EOF; dropping the pipe early kills yt-dlp with SIGPIPE.
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end();
                        debug!(target: "yt-dlp", "{line}");
                        if let Some(pct) = parse_progress_from_line(line) {
                            progress(pct);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "lost yt-dlp output");
                        break;
                    }
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| DownloadError(format!("lost track of {}: {e}", self.binary.display())))?;
        let stderr = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            warn!(%status, "yt-dlp exited unsuccessfully");
            Err(DownloadError(failure_message(status, &stderr)))
        }
    }
}

/// Picks the most useful line out of yt-dlp's stderr
fn failure_message(status: ExitStatus, stderr: &str) -> String {
    if let Some(line) = stderr.lines().rev().find(|l| l.starts_with("ERROR:")) {
        return line.trim().to_owned();
    }
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("yt-dlp exited with {status}")
    } else {
        trimmed.to_owned()
    }
}
