// Directory scanner: lists the IA frame files to wrap, in frame order
//
// Hidden entries (leading '.') and directories are skipped. The order is
// chosen explicitly by FrameOrder rather than left to the filesystem.

use crate::{Error, Result};
use glob::Pattern;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// How frame files are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameOrder {
    /// Digit runs compare as numbers: 2.iab before 10.iab
    #[default]
    Natural,
    /// Byte-wise file name order
    Lexical,
    /// Whatever order the filesystem enumerates (platform dependent)
    FileSystem,
}

/// Directory scan settings
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub order: FrameOrder,
    /// Only keep file names matching this glob pattern
    pub pattern: Option<Pattern>,
}

impl ScanOptions {
    pub fn with_order(mut self, order: FrameOrder) -> Self {
        self.order = order;
        self
    }

    /// Restrict to file names matching a glob pattern such as `*.iab`
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let pattern =
            Pattern::new(pattern).map_err(|e| Error::InvalidPattern(format!("{pattern}: {e}")))?;
        self.pattern = Some(pattern);
        Ok(self)
    }
}

/// List the frame files of `dir` in frame order
pub fn scan_frame_directory(dir: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>> {
    let directory_error = |source| Error::InputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(directory_error)? {
        let entry = entry.map_err(directory_error)?;
        let name = entry.file_name();

        // Skip hidden and special files
        if name.as_encoded_bytes().first() == Some(&b'.') {
            continue;
        }

        let path = entry.path();

        // Skip directories
        if path.is_dir() {
            continue;
        }

        if let Some(pattern) = &options.pattern {
            if !pattern.matches(&name.to_string_lossy()) {
                continue;
            }
        }

        files.push(path);
    }

    match options.order {
        FrameOrder::Natural => files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b))),
        FrameOrder::Lexical => files.sort_by(|a, b| a.file_name().cmp(&b.file_name())),
        FrameOrder::FileSystem => {}
    }

    tracing::debug!(
        dir = %dir.display(),
        count = files.len(),
        order = ?options.order,
        "Scanned IA frame directory"
    );
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare names with ASCII digit runs taken as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_chunks = split_digit_runs(a);
    let b_chunks = split_digit_runs(b);

    for (x, y) in a_chunks.iter().zip(b_chunks.iter()) {
        let ordering = match (is_number(x), is_number(y)) {
            (true, true) => compare_numbers(x, y),
            _ => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_chunks
        .len()
        .cmp(&b_chunks.len())
        // Total order for names like 01 and 1
        .then_with(|| a.cmp(b))
}

fn is_number(chunk: &str) -> bool {
    chunk.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// Compare digit strings of any length without overflowing
fn compare_numbers(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

fn split_digit_runs(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        if in_digits.is_some_and(|d| d != digit) {
            chunks.push(&s[start..i]);
            start = i;
        }
        in_digits = Some(digit);
    }
    if start < s.len() {
        chunks.push(&s[start..]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| file_name(p)).collect()
    }

    #[test]
    fn test_natural_cmp() {
        let mut list = vec!["10.iab", "2.iab", "1.iab", "frame_10", "frame_9", "01.iab"];
        list.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(list, vec!["01.iab", "1.iab", "2.iab", "10.iab", "frame_9", "frame_10"]);
        assert_eq!(natural_cmp("a", "a"), Ordering::Equal);
        assert_eq!(
            natural_cmp("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_split_digit_runs() {
        assert_eq!(split_digit_runs("ab12cd3"), vec!["ab", "12", "cd", "3"]);
        assert_eq!(split_digit_runs(""), Vec::<&str>::new());
    }

    #[test]
    fn test_scan_skips_hidden_and_directories() {
        let dir = tempdir().unwrap();
        for name in ["2.iab", "10.iab", "1.iab", ".hidden", ".DS_Store"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();

        let files = scan_frame_directory(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(names(&files), vec!["1.iab", "2.iab", "10.iab"]);

        let lexical = ScanOptions::default().with_order(FrameOrder::Lexical);
        let files = scan_frame_directory(dir.path(), &lexical).unwrap();
        assert_eq!(names(&files), vec!["1.iab", "10.iab", "2.iab"]);

        let unordered = ScanOptions::default().with_order(FrameOrder::FileSystem);
        let mut files = names(&scan_frame_directory(dir.path(), &unordered).unwrap());
        files.sort();
        assert_eq!(files, vec!["1.iab", "10.iab", "2.iab"]);
    }

    #[test]
    fn test_scan_with_pattern() {
        let dir = tempdir().unwrap();
        for name in ["0.iab", "1.iab", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let options = ScanOptions::default().with_pattern("*.iab").unwrap();
        let files = scan_frame_directory(dir.path(), &options).unwrap();
        assert_eq!(names(&files), vec!["0.iab", "1.iab"]);

        assert!(matches!(
            ScanOptions::default().with_pattern("["),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempdir().unwrap();
        let err = scan_frame_directory(&dir.path().join("missing"), &ScanOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::InputDirectory { .. }));
        assert!(err.to_string().starts_with("Cannot open IA Frame directory"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();
        let files = scan_frame_directory(dir.path(), &ScanOptions::default()).unwrap();
        assert!(files.is_empty());
    }
}
