use std::sync::Arc;

use tracing::{info, warn};

use crate::api_client::{BackendProvider, QuoteProvider};
use crate::domain::models::{Holding, PortfolioSummary};
use crate::domain::repository::PortfolioCache;
use crate::errors::ProviderError;
use crate::usecases::valuation::summarize_portfolio;

/// Where a loaded portfolio came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioSource {
    Remote,
    Cache,
}

impl PortfolioSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortfolioSource::Remote => "remote",
            PortfolioSource::Cache => "cache",
        }
    }
}

pub struct LoadedPortfolio {
    pub holdings: Vec<Holding>,
    pub summary: PortfolioSummary,
    pub source: PortfolioSource,
}

/// Portfolio operations against the backend, mirrored into the local
/// cache after every successful remote read.
pub struct PortfolioService {
    provider: Arc<dyn BackendProvider>,
    quotes: Arc<dyn QuoteProvider>,
    cache: Arc<dyn PortfolioCache>,
}

impl PortfolioService {
    pub fn new(
        provider: Arc<dyn BackendProvider>,
        quotes: Arc<dyn QuoteProvider>,
        cache: Arc<dyn PortfolioCache>,
    ) -> Self {
        Self {
            provider,
            quotes,
            cache,
        }
    }

    /// Remote-first load with explicit cache fallback: a failed fetch
    /// falls back to the last mirrored snapshot instead of erroring, and
    /// a successful fetch replaces that snapshot wholesale.
    pub async fn load_portfolio(
        &self,
        username: &str,
        token: &str,
    ) -> Result<LoadedPortfolio, ProviderError> {
        match self.provider.fetch_portfolio(username, token).await {
            Ok(mut holdings) => {
                self.refresh_prices(&mut holdings).await;
                if let Err(e) = self.cache.write_cache(username, &holdings) {
                    warn!(username, error = %e, "Failed mirroring portfolio to cache");
                }
                let summary = summarize_portfolio(&holdings);
                Ok(LoadedPortfolio {
                    holdings,
                    summary,
                    source: PortfolioSource::Remote,
                })
            }
            Err(e) => match self.cache.read_cache(username) {
                Some(holdings) => {
                    info!(username, error = %e, "Remote fetch failed, serving cached portfolio");
                    let summary = summarize_portfolio(&holdings);
                    Ok(LoadedPortfolio {
                        holdings,
                        summary,
                        source: PortfolioSource::Cache,
                    })
                }
                None => Err(e),
            },
        }
    }

    /// Best-effort price refresh from the quote provider; a failed quote
    /// keeps the stored price.
    async fn refresh_prices(&self, holdings: &mut [Holding]) {
        for holding in holdings.iter_mut() {
            match self.quotes.fetch_quote(&holding.symbol).await {
                Ok(quote) if quote.price > 0.0 => holding.current_price = quote.price,
                Ok(_) => {}
                Err(e) => {
                    warn!(symbol = %holding.symbol, error = %e, "Quote refresh failed, keeping stored price");
                }
            }
        }
    }

    pub async fn add_holding(
        &self,
        username: &str,
        token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError> {
        let created = self.provider.create_holding(username, token, holding).await?;
        self.remirror(username, token).await;
        Ok(created)
    }

    pub async fn update_holding(
        &self,
        username: &str,
        id: &str,
        token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError> {
        let updated = self
            .provider
            .update_holding(username, id, token, holding)
            .await?;
        self.remirror(username, token).await;
        Ok(updated)
    }

    pub async fn delete_holding(
        &self,
        username: &str,
        id: &str,
        token: &str,
    ) -> Result<(), ProviderError> {
        self.provider.delete_holding(username, id, token).await?;
        self.remirror(username, token).await;
        Ok(())
    }

    // Refresh the mirror after a mutation so offline reads see the change.
    async fn remirror(&self, username: &str, token: &str) {
        match self.provider.fetch_portfolio(username, token).await {
            Ok(holdings) => {
                if let Err(e) = self.cache.write_cache(username, &holdings) {
                    warn!(username, error = %e, "Failed refreshing portfolio cache");
                }
            }
            Err(e) => warn!(username, error = %e, "Skipped cache refresh after mutation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{MockBackendProvider, MockQuoteProvider};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryCache {
        entries: Mutex<HashMap<String, Vec<Holding>>>,
    }

    impl MemoryCache {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
            }
        }
    }

    impl PortfolioCache for MemoryCache {
        fn read_cache(&self, username: &str) -> Option<Vec<Holding>> {
            self.entries.lock().unwrap().get(username).cloned()
        }

        fn write_cache(
            &self,
            username: &str,
            holdings: &[Holding],
        ) -> crate::domain::repository::CacheResult<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(username.to_string(), holdings.to_vec());
            Ok(())
        }
    }

    fn holding(symbol: &str, qty: f64, buy: f64, now: f64) -> Holding {
        Holding {
            id: Some(format!("id-{symbol}")),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            exchange: "NSE".to_string(),
            quantity: qty,
            purchase_price: buy,
            current_price: now,
            notes: None,
        }
    }

    fn service(
        backend: MockBackendProvider,
        prices: HashMap<String, f64>,
    ) -> (PortfolioService, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let svc = PortfolioService::new(
            Arc::new(backend),
            Arc::new(MockQuoteProvider::new(prices)),
            cache.clone(),
        );
        (svc, cache)
    }

    #[tokio::test]
    async fn remote_load_mirrors_cache_and_refreshes_prices() {
        let backend =
            MockBackendProvider::new(json!([]), vec![holding("TCS", 2.0, 3000.0, 3000.0)]);
        let mut prices = HashMap::new();
        prices.insert("TCS".to_string(), 3500.0);
        let (svc, cache) = service(backend, prices);

        let loaded = svc.load_portfolio("alice", "token").await.unwrap();
        assert_eq!(loaded.source, PortfolioSource::Remote);
        assert_eq!(loaded.holdings[0].current_price, 3500.0);
        assert_eq!(loaded.summary.current_value, 7000.0);

        let mirrored = cache.read_cache("alice").unwrap();
        assert_eq!(mirrored[0].current_price, 3500.0);
    }

    #[tokio::test]
    async fn failed_remote_falls_back_to_cache() {
        let mut backend = MockBackendProvider::new(json!([]), vec![]);
        backend.fail_portfolio = true;
        let (svc, cache) = service(backend, HashMap::new());
        cache
            .write_cache("bob", &[holding("INFY", 1.0, 1500.0, 1600.0)])
            .unwrap();

        let loaded = svc.load_portfolio("bob", "token").await.unwrap();
        assert_eq!(loaded.source, PortfolioSource::Cache);
        assert_eq!(loaded.holdings[0].symbol, "INFY");
        assert_eq!(loaded.summary.total_stocks, 1);
    }

    #[tokio::test]
    async fn failed_remote_with_empty_cache_errors() {
        let mut backend = MockBackendProvider::new(json!([]), vec![]);
        backend.fail_portfolio = true;
        let (svc, _cache) = service(backend, HashMap::new());
        assert!(svc.load_portfolio("carol", "token").await.is_err());
    }

    #[tokio::test]
    async fn quote_failure_keeps_stored_price() {
        let backend =
            MockBackendProvider::new(json!([]), vec![holding("SBIN", 3.0, 500.0, 620.0)]);
        let (svc, _cache) = service(backend, HashMap::new());
        let loaded = svc.load_portfolio("dave", "token").await.unwrap();
        assert_eq!(loaded.holdings[0].current_price, 620.0);
    }

    #[tokio::test]
    async fn mutations_refresh_the_mirror() {
        let backend = MockBackendProvider::new(json!([]), vec![]);
        let (svc, cache) = service(backend, HashMap::new());

        let created = svc
            .add_holding("erin", "token", &holding("TCS", 1.0, 3000.0, 3100.0))
            .await
            .unwrap();
        assert!(created.id.is_some());
        assert_eq!(cache.read_cache("erin").unwrap().len(), 1);

        svc.delete_holding("erin", created.id.as_deref().unwrap(), "token")
            .await
            .unwrap();
        assert!(cache.read_cache("erin").unwrap().is_empty());
    }
}
