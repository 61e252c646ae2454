/// Prefix emitted by the `--progress-template` passed to yt-dlp
pub const PROGRESS_PREFIX: &str = "downloaded_bytes:";

/// Parses a `downloaded_bytes: 42.0%` line into a fraction in `0.0..=1.0`
pub fn parse_progress_from_line(line: &str) -> Option<f32> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let number = rest.trim().strip_suffix('%')?;
    let v = number.trim().parse::<f32>().ok()?;
    v.is_finite().then(|| (v / 100.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_lines() {
        assert_eq!(parse_progress_from_line("downloaded_bytes:  42.5%"), Some(0.425));
        assert_eq!(parse_progress_from_line("downloaded_bytes:100.0%\n"), Some(1.0));
    }

    #[test]
    fn ignores_other_output() {
        assert_eq!(parse_progress_from_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_from_line("downloaded_bytes: N/A"), None);
        assert_eq!(parse_progress_from_line("downloaded_bytes: NaN%"), None);
    }
}
