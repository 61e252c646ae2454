use std::path::PathBuf;

use thiserror::Error;

use crate::model::{MediaKind, ParseKindError, ParseQualityError, VideoQuality};

pub const ENV_DOWNLOAD_DIR: &str = "MEOW_DOWNLOAD_DIR";
pub const ENV_YTDLP: &str = "MEOW_YTDLP";
pub const ENV_DEFAULT_KIND: &str = "MEOW_DEFAULT_KIND";
pub const ENV_DEFAULT_QUALITY: &str = "MEOW_DEFAULT_QUALITY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MEOW_DEFAULT_KIND: {0}")]
    Kind(#[from] ParseKindError),
    #[error("MEOW_DEFAULT_QUALITY: {0}")]
    Quality(#[from] ParseQualityError),
}

/// Settings resolved once at startup and handed to the window
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub download_dir: PathBuf,
    pub ytdlp_binary: PathBuf,
    pub default_kind: MediaKind,
    pub default_quality: VideoQuality,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok(), default_download_dir)
    }

    fn resolve(
        var: impl Fn(&str) -> Option<String>,
        fallback_dir: impl FnOnce() -> PathBuf,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let download_dir = var(ENV_DOWNLOAD_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(fallback_dir);
        let ytdlp_binary = var(ENV_YTDLP)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_binary()));
        let default_kind = match var(ENV_DEFAULT_KIND) {
            Some(v) => v.parse()?,
            None => MediaKind::AudioOnly,
        };
        let default_quality = match var(ENV_DEFAULT_QUALITY) {
            Some(v) => v.parse()?,
            None => VideoQuality::Best,
        };

        Ok(Self {
            download_dir,
            ytdlp_binary,
            default_kind,
            default_quality,
        })
    }
}

fn default_binary() -> &'static str {
    if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" }
}

/// The user's desktop, falling back to home and then the working directory
fn default_download_dir() -> PathBuf {
    pick_download_dir(dirs::desktop_dir(), dirs::home_dir())
}

fn pick_download_dir(desktop: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    desktop.or(home).unwrap_or_else(|| PathBuf::from("."))
}
