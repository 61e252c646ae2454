//! Maps a [`DownloadRequest`] onto yt-dlp format and output settings.

use crate::model::{DownloadRequest, MediaKind};

/// Format selector and output template handed to the downloader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadOptions {
    pub format: String,
    pub output_template: String,
}

impl DownloadOptions {
    pub fn from_request(request: &DownloadRequest) -> Self {
        let (format, ext) = match request.kind {
            MediaKind::AudioOnly => ("bestaudio/best".to_owned(), "mp3"),
            MediaKind::Video => match request.quality.height() {
                Some(height) => (format!("best[height<={height}]"), "mp4"),
                None => ("best".to_owned(), "mp4"),
            },
        };
        Self {
            format,
            output_template: format!("{}/%(title)s.{ext}", request.destination),
        }
    }

    /// Command-line form understood by yt-dlp
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-f".to_owned(),
            self.format.clone(),
            "-o".to_owned(),
            self.output_template.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VideoQuality;

    fn options(url: &str, kind: MediaKind, quality: VideoQuality) -> DownloadOptions {
        DownloadOptions::from_request(&DownloadRequest::new(url, "/tmp/out", kind, quality).unwrap())
    }

    #[test]
    fn audio_ignores_quality() {
        for quality in VideoQuality::ALL {
            let opts = options("https://example.com/v1", MediaKind::AudioOnly, quality);
            assert_eq!(opts.format, "bestaudio/best");
            assert!(opts.output_template.ends_with(".mp3"));
        }
    }

    #[test]
    fn audio_scenario() {
        assert_eq!(
            options("https://example.com/v1", MediaKind::AudioOnly, VideoQuality::Best),
            DownloadOptions {
                format: "bestaudio/best".to_owned(),
                output_template: "/tmp/out/%(title)s.mp3".to_owned(),
            }
        );
    }

    #[test]
    fn best_video_has_no_height_cap() {
        let opts = options("https://example.com/v", MediaKind::Video, VideoQuality::Best);
        assert_eq!(opts.format, "best");
        assert!(!opts.format.contains("height"));
        assert_eq!(opts.output_template, "/tmp/out/%(title)s.mp4");
    }

    #[test]
    fn capped_video_matches_label() {
        let opts = options("https://example.com/v2", MediaKind::Video, VideoQuality::P720);
        assert_eq!(
            opts,
            DownloadOptions {
                format: "best[height<=720]".to_owned(),
                output_template: "/tmp/out/%(title)s.mp4".to_owned(),
            }
        );

        for n in [360u32, 480, 720, 1080] {
            let quality: VideoQuality = format!("{n}p").parse().unwrap();
            let opts = options("https://example.com/v", MediaKind::Video, quality);
            let cap = opts
                .format
                .strip_prefix("best[height<=")
                .and_then(|s| s.strip_suffix(']'))
                .and_then(|s| s.parse::<u32>().ok());
            assert_eq!(cap, Some(n));
        }
    }

    #[test]
    fn args_carry_format_and_template() {
        let opts = options("https://example.com/v", MediaKind::Video, VideoQuality::P480);
        assert_eq!(
            opts.to_args(),
            ["-f", "best[height<=480]", "-o", "/tmp/out/%(title)s.mp4"]
        );
    }
}
