use crate::domain::models::Holding;
use crate::errors::CacheError;

pub type CacheResult<T> = Result<T, CacheError>;

/// Local mirror of the last successfully fetched portfolio.
///
/// Two-tier policy: the remote backend is the source of truth; the cache
/// is written after every successful remote fetch and read only when the
/// remote fetch fails. The fallback decision itself lives in
/// `PortfolioService::load_portfolio`, not inside implementations.
pub trait PortfolioCache: Send + Sync {
    /// Last mirrored holdings for the user, if any.
    fn read_cache(&self, username: &str) -> Option<Vec<Holding>>;

    /// Replace the mirrored holdings for the user (last write wins).
    fn write_cache(&self, username: &str, holdings: &[Holding]) -> CacheResult<()>;
}
