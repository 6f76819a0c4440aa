use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::models::Holding;
use crate::domain::repository::{CacheResult, PortfolioCache};

/// File-backed key-value mirror of the last fetched portfolio. One JSON
/// file per user under the cache directory, keyed
/// `stock_portfolio_<username>`.
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, username: &str) -> PathBuf {
        // Usernames come from route segments; keep the file name tame.
        let safe: String = username
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("stock_portfolio_{safe}.json"))
    }
}

impl PortfolioCache for FileCacheStore {
    fn read_cache(&self, username: &str) -> Option<Vec<Holding>> {
        let path = self.entry_path(username);
        if !Path::new(&path).exists() {
            return None;
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed reading portfolio cache");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(holdings) => Some(holdings),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding corrupt portfolio cache");
                None
            }
        }
    }

    fn write_cache(&self, username: &str, holdings: &[Holding]) -> CacheResult<()> {
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_string(holdings)?;
        fs::write(self.entry_path(username), payload)?;
        Ok(())
    }
}
