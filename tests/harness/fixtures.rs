// tests/harness/fixtures.rs
//
// Loader for archive fixtures kept under tests/fixtures/takeout.

use std::path::PathBuf;

/// A loaded archive fixture.
#[derive(Debug, Clone)]
pub struct ArchiveFixture {
    pub text: String,
    /// Original file path for debugging
    pub source_path: String,
}

/// Error type for fixture loading operations.
#[derive(Debug)]
pub enum FixtureError {
    Io(std::io::Error),
    NotAnArchive(String),
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureError::Io(e) => write!(f, "IO error: {}", e),
            FixtureError::NotAnArchive(path) => write!(f, "No marker line in {}", path),
        }
    }
}

impl std::error::Error for FixtureError {}

impl From<std::io::Error> for FixtureError {
    fn from(err: std::io::Error) -> Self {
        FixtureError::Io(err)
    }
}

pub struct FixtureLoader {
    base_path: PathBuf,
}

impl FixtureLoader {
    /// Create a new fixture loader pointing to the standard fixtures directory.
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("tests")
                .join("fixtures")
                .join("takeout"),
        }
    }

    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn load_archive(&self, relative_path: &str) -> Result<ArchiveFixture, FixtureError> {
        let path = self.base_path.join(relative_path);
        let text = std::fs::read_to_string(&path)?;
        let source_path = path.to_string_lossy().to_string();

        if !text.lines().any(is_marker_line) {
            return Err(FixtureError::NotAnArchive(source_path));
        }
        Ok(ArchiveFixture { text, source_path })
    }

    /// Load every .mbox file in the fixtures directory, sorted by name.
    pub fn load_all(&self) -> Result<Vec<ArchiveFixture>, FixtureError> {
        let mut fixtures = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "mbox").unwrap_or(false) {
                let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                fixtures.push(self.load_archive(&name)?);
            }
        }
        fixtures.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        Ok(fixtures)
    }
}

impl Default for FixtureLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_marker_line(line: &str) -> bool {
    line.strip_prefix("From ")
        .map(|rest| rest.trim_start_matches('-'))
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_marker_lines() {
        assert!(is_marker_line("From 12345"));
        assert!(is_marker_line("From -67890"));
        assert!(!is_marker_line("From a@b.com Thu Jan 1 00:00:00 1970"));
        assert!(!is_marker_line("From -"));
    }

    #[test]
    fn test_load_archive_requires_marker() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("good.mbox"), "From 1\nSubject: s\n\nbody\n").unwrap();
        fs::write(temp_dir.path().join("bad.mbox"), "Subject: s\n\nbody\n").unwrap();

        let loader = FixtureLoader::with_base_path(temp_dir.path().to_path_buf());
        assert!(loader.load_archive("good.mbox").is_ok());
        assert!(matches!(
            loader.load_archive("bad.mbox"),
            Err(FixtureError::NotAnArchive(_))
        ));
    }

    #[test]
    fn test_bundled_fixtures_load() {
        let fixtures = FixtureLoader::new().load_all().unwrap();
        assert!(!fixtures.is_empty());
        assert!(fixtures[0].source_path.ends_with(".mbox"));
    }
}
