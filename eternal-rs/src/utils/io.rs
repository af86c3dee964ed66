//! I/O and path utilities

use std::path::{Path, PathBuf};

/// Shorten an entry path for display, keeping its tail
///
/// The cut lands on a `/` when one is available, so the file name stays
/// whole.
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }

    let keep = max_len.saturating_sub(3);
    let tail: String = path.chars().skip(len - keep).collect();
    match tail.find('/') {
        Some(pos) if pos + 1 < tail.len() => format!(".../{}", &tail[pos + 1..]),
        _ => format!("...{tail}"),
    }
}

/// Where an extracted entry lands
///
/// With `preserve_paths` the entry's directories are recreated below
/// `output_dir`; otherwise only the file name is used.
pub fn extraction_path(output_dir: &Path, entry_name: &str, preserve_paths: bool) -> PathBuf {
    if preserve_paths {
        entry_name
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(output_dir.to_path_buf(), |path, part| path.join(part))
    } else {
        output_dir.join(entry_name.rsplit('/').next().unwrap_or(entry_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_path() {
        assert_eq!(truncate_path("short.lwo", 20), "short.lwo");
        assert_eq!(
            truncate_path("models/mapobjects/hell/crate_01.lwo", 20),
            ".../crate_01.lwo"
        );
        assert_eq!(truncate_path("abcdefghij", 8), "...fghij");

        let result = truncate_path("very/long/path/to/file.lwo", 15);
        assert!(result.len() <= 15, "{result} is too long");
        assert!(result.starts_with("..."));
        assert!(result.ends_with("file.lwo"));
    }

    #[test]
    fn test_extraction_path() {
        let out = Path::new("out");
        assert_eq!(
            extraction_path(out, "models/props/crate.lwo", true),
            Path::new("out").join("models").join("props").join("crate.lwo")
        );
        assert_eq!(
            extraction_path(out, "models/props/crate.lwo", false),
            Path::new("out").join("crate.lwo")
        );
    }
}
