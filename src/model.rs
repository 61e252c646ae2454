use std::{fmt, str::FromStr};

use thiserror::Error;

/// Whether the user wants audio only or the full video
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// Best audio stream, saved as `.mp3`
    AudioOnly,
    /// Combined stream, saved as `.mp4`
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::AudioOnly => "MP3 (audio)",
            MediaKind::Video => "MP4 (video)",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown media kind {0:?}, expected mp3 or mp4")]
pub struct ParseKindError(pub String);

impl FromStr for MediaKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" | "audio" => Ok(MediaKind::AudioOnly),
            "mp4" | "video" => Ok(MediaKind::Video),
            _ => Err(ParseKindError(s.to_owned())),
        }
    }
}

/// Maximum video height; only meaningful for [`MediaKind::Video`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoQuality {
    #[default]
    Best,
    P360,
    P480,
    P720,
    P1080,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 5] = [
        VideoQuality::Best,
        VideoQuality::P360,
        VideoQuality::P480,
        VideoQuality::P720,
        VideoQuality::P1080,
    ];

    /// Height cap in pixels, `None` for unrestricted
    pub fn height(self) -> Option<u32> {
        match self {
            VideoQuality::Best => None,
            VideoQuality::P360 => Some(360),
            VideoQuality::P480 => Some(480),
            VideoQuality::P720 => Some(720),
            VideoQuality::P1080 => Some(1080),
        }
    }

    pub fn label(self) -> String {
        match self.height() {
            Some(h) => format!("{h}p"),
            None => "best".to_owned(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown video quality {0:?}, expected best, 360p, 480p, 720p or 1080p")]
pub struct ParseQualityError(pub String);

impl FromStr for VideoQuality {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        if label == "best" {
            return Ok(VideoQuality::Best);
        }
        let height = label
            .strip_suffix('p')
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| ParseQualityError(s.to_owned()))?;
        VideoQuality::ALL
            .into_iter()
            .find(|q| q.height() == Some(height))
            .ok_or_else(|| ParseQualityError(s.to_owned()))
    }
}

/// Input rejected before any task is launched
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid video URL.")]
    EmptyUrl,
    #[error("Please choose a destination folder.")]
    NoDestination,
    #[error("The destination folder {0} does not exist.")]
    DestinationMissing(String),
}

/// One download as requested by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub destination: String,
    pub kind: MediaKind,
    pub quality: VideoQuality,
}

impl DownloadRequest {
    /// Builds a request, rejecting an empty URL or destination
    pub fn new(
        url: &str,
        destination: &str,
        kind: MediaKind,
        quality: VideoQuality,
    ) -> Result<Self, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(ValidationError::NoDestination);
        }
        Ok(Self {
            url: url.to_owned(),
            destination: destination.to_owned(),
            kind,
            quality,
        })
    }
}

/// Terminal result of one download attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success,
    Failure(String),
}

/// Identifies a download within one window session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents the current state of a download
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadStatus {
    /// Worker is running, with the last reported progress (0.0 to 1.0)
    Downloading(f32),
    /// Download has completed successfully
    Done,
    /// Download failed with the downloader's message
    Failed(String),
}

/// Data structure for tracking a download task in the UI
pub struct DownloadTask {
    /// Session-unique id shown in the list and in notices
    pub id: TaskId,
    /// URL as entered by the user
    pub url: String,
    /// Folder the media is written to
    pub destination: String,
    /// Current status of the download
    pub status: DownloadStatus,
}

impl DownloadTask {
    pub fn is_finished(&self) -> bool {
        !matches!(self.status, DownloadStatus::Downloading(_))
    }
}
