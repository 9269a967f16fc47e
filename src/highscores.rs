//! Persist the high score to disk (XDG config or ~/.config/bricktui) as `highscore: <n>`.

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const DIRNAME: &str = "bricktui";
const FILENAME: &str = "highscore";
const KEY: &str = "highscore";

/// Load/save of the single persisted high score. Failures never reach the caller.
pub trait HighScoreStore {
    /// Stored high score, or 0 when absent or unreadable.
    fn load(&mut self) -> u32;
    /// Best-effort write.
    fn save(&mut self, high_score: u32);
}

/// Returns the default path of the high score file (config dir / bricktui / highscore).
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(DIRNAME).join(FILENAME)
}

/// Parse `highscore: <n>`. Anything else yields `None`.
pub fn parse_record(content: &str) -> Option<u32> {
    let rest = content.trim_start().strip_prefix(KEY)?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let digits: &str = rest
        .trim_start()
        .split(|c: char| !c.is_ascii_digit())
        .next()?;
    digits.parse().ok()
}

pub fn format_record(high_score: u32) -> String {
    format!("{KEY}: {high_score}")
}

/// High score kept in a text file.
#[derive(Debug, Clone)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<u32> {
        let content = fs::read_to_string(&self.path)?;
        Ok(parse_record(&content).unwrap_or(0))
    }

    fn write(&self, high_score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut f = fs::File::create(&self.path)?;
        write!(f, "{}", format_record(high_score))?;
        Ok(())
    }
}

impl Default for HighScoreFile {
    fn default() -> Self {
        Self::new(default_path())
    }
}

impl HighScoreStore for HighScoreFile {
    fn load(&mut self) -> u32 {
        match self.read() {
            Ok(n) => n,
            Err(err) => {
                log::debug!("no high score at {}: {err}", self.path.display());
                0
            }
        }
    }

    fn save(&mut self, high_score: u32) {
        if let Err(err) = self.write(high_score) {
            log::warn!("could not save high score to {}: {err}", self.path.display());
        }
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    pub value: u32,
    pub saves: usize,
}

impl MemoryHighScore {
    pub fn new(value: u32) -> Self {
        Self { value, saves: 0 }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&mut self) -> u32 {
        self.value
    }

    fn save(&mut self, high_score: u32) {
        self.value = high_score;
        self.saves += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("bricktui_test_{tag}_{nanos}"))
            .join(FILENAME)
    }

    #[test]
    fn parses_record() {
        assert_eq!(parse_record("highscore: 1500"), Some(1500));
        assert_eq!(parse_record("highscore:42\n"), Some(42));
        assert_eq!(parse_record("  highscore :  7 trailing"), Some(7));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("score: 10"), None);
        assert_eq!(parse_record("highscore: abc"), None);
        assert_eq!(parse_record("highscore: -5"), None);
    }

    #[test]
    fn missing_file_loads_zero() {
        let mut store = HighScoreFile::new(unique_temp_path("missing"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn save_then_load() {
        let path = unique_temp_path("roundtrip");
        let mut store = HighScoreFile::new(&path);
        store.save(2100);
        assert_eq!(fs::read_to_string(&path).unwrap(), "highscore: 2100");
        assert_eq!(HighScoreFile::new(&path).load(), 2100);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unparsable_file_loads_zero() {
        let path = unique_temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not a score").unwrap();
        assert_eq!(HighScoreFile::new(&path).load(), 0);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unwritable_path_is_silently_skipped() {
        let path = unique_temp_path("blocked");
        // parent "directory" is a regular file, so create_dir_all fails
        let parent = path.parent().unwrap().to_path_buf();
        fs::write(&parent, "x").unwrap();
        let mut store = HighScoreFile::new(parent.join("nested").join(FILENAME));
        store.save(10);
        assert_eq!(store.load(), 0);
        let _ = fs::remove_file(parent);
    }
}
