use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::domain::models::{Holding, Investment, Quote};
use crate::errors::ProviderError;

/// Remote backend holding user auth, investments and the stock portfolio.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Raw mutual-fund company listing. Returned as untyped JSON: the
    /// grouping engine owns validation and never trusts the shape.
    async fn fetch_fund_companies(&self) -> Result<Value, ProviderError>;

    async fn fetch_portfolio(&self, username: &str, token: &str)
        -> Result<Vec<Holding>, ProviderError>;
    async fn create_holding(
        &self,
        username: &str,
        token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError>;
    async fn update_holding(
        &self,
        username: &str,
        id: &str,
        token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError>;
    async fn delete_holding(&self, username: &str, id: &str, token: &str)
        -> Result<(), ProviderError>;

    async fn fetch_investments(&self, token: &str) -> Result<Vec<Investment>, ProviderError>;
    async fn create_investment(
        &self,
        token: &str,
        investment: &Investment,
    ) -> Result<Investment, ProviderError>;

    async fn forgot_password(&self, body: &Value) -> Result<Value, ProviderError>;
    async fn verify_security_pin(&self, body: &Value) -> Result<Value, ProviderError>;
}

/// Third-party price feed for listed stocks.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;
}

pub struct ReqwestBackendProvider {
    client: Client,
    config: ApiConfig,
}

impl ReqwestBackendProvider {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl BackendProvider for ReqwestBackendProvider {
    async fn fetch_fund_companies(&self) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(self.config.fund_companies_url())
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn fetch_portfolio(
        &self,
        username: &str,
        token: &str,
    ) -> Result<Vec<Holding>, ProviderError> {
        let response = self
            .client
            .get(self.config.portfolio_url(username))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        // Parse as a value first so a wrong-shaped body is reported as a
        // shape problem, not a transport one.
        let raw: Value = response.json().await?;
        serde_json::from_value(raw).map_err(|e| ProviderError::DataShape(e.to_string()))
    }

    async fn create_holding(
        &self,
        username: &str,
        token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError> {
        let response = self
            .client
            .post(self.config.portfolio_url(username))
            .bearer_auth(token)
            .json(holding)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn update_holding(
        &self,
        username: &str,
        id: &str,
        token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError> {
        let response = self
            .client
            .put(self.config.portfolio_entry_url(username, id))
            .bearer_auth(token)
            .json(holding)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn delete_holding(
        &self,
        username: &str,
        id: &str,
        token: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .delete(self.config.portfolio_entry_url(username, id))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn fetch_investments(&self, token: &str) -> Result<Vec<Investment>, ProviderError> {
        let response = self
            .client
            .get(self.config.investments_url())
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        let raw: Value = response.json().await?;
        serde_json::from_value(raw).map_err(|e| ProviderError::DataShape(e.to_string()))
    }

    async fn create_investment(
        &self,
        token: &str,
        investment: &Investment,
    ) -> Result<Investment, ProviderError> {
        let response = self
            .client
            .post(self.config.investments_url())
            .bearer_auth(token)
            .json(investment)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn forgot_password(&self, body: &Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.config.forgot_password_url())
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn verify_security_pin(&self, body: &Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.config.verify_security_pin_url())
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

pub struct ReqwestQuoteProvider {
    client: Client,
    config: ApiConfig,
}

impl ReqwestQuoteProvider {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl QuoteProvider for ReqwestQuoteProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let response = self
            .client
            .get(self.config.quote_url(symbol))
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

// Simple mock providers for tests and handler wiring without a backend.
pub struct MockBackendProvider {
    pub companies: Value,
    pub holdings: std::sync::Mutex<Vec<Holding>>,
    pub investments: std::sync::Mutex<Vec<Investment>>,
    pub fail_portfolio: bool,
}

impl MockBackendProvider {
    #[allow(dead_code)]
    pub fn new(companies: Value, holdings: Vec<Holding>) -> Self {
        Self {
            companies,
            holdings: std::sync::Mutex::new(holdings),
            investments: std::sync::Mutex::new(Vec::new()),
            fail_portfolio: false,
        }
    }
}

#[async_trait]
impl BackendProvider for MockBackendProvider {
    async fn fetch_fund_companies(&self) -> Result<Value, ProviderError> {
        Ok(self.companies.clone())
    }

    async fn fetch_portfolio(
        &self,
        _username: &str,
        _token: &str,
    ) -> Result<Vec<Holding>, ProviderError> {
        if self.fail_portfolio {
            return Err(ProviderError::Status(503));
        }
        Ok(self.holdings.lock().unwrap().clone())
    }

    async fn create_holding(
        &self,
        _username: &str,
        _token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError> {
        if self.fail_portfolio {
            return Err(ProviderError::Status(503));
        }
        let mut created = holding.clone();
        let mut holdings = self.holdings.lock().unwrap();
        created.id = Some(format!("mock-{}", holdings.len() + 1));
        holdings.push(created.clone());
        Ok(created)
    }

    async fn update_holding(
        &self,
        _username: &str,
        id: &str,
        _token: &str,
        holding: &Holding,
    ) -> Result<Holding, ProviderError> {
        let mut holdings = self.holdings.lock().unwrap();
        match holdings.iter_mut().find(|h| h.id.as_deref() == Some(id)) {
            Some(existing) => {
                *existing = Holding {
                    id: Some(id.to_string()),
                    ..holding.clone()
                };
                Ok(existing.clone())
            }
            None => Err(ProviderError::Status(404)),
        }
    }

    async fn delete_holding(
        &self,
        _username: &str,
        id: &str,
        _token: &str,
    ) -> Result<(), ProviderError> {
        let mut holdings = self.holdings.lock().unwrap();
        let before = holdings.len();
        holdings.retain(|h| h.id.as_deref() != Some(id));
        if holdings.len() == before {
            return Err(ProviderError::Status(404));
        }
        Ok(())
    }

    async fn fetch_investments(&self, _token: &str) -> Result<Vec<Investment>, ProviderError> {
        Ok(self.investments.lock().unwrap().clone())
    }

    async fn create_investment(
        &self,
        _token: &str,
        investment: &Investment,
    ) -> Result<Investment, ProviderError> {
        let mut created = investment.clone();
        let mut investments = self.investments.lock().unwrap();
        created.id = Some(format!("inv-{}", investments.len() + 1));
        investments.push(created.clone());
        Ok(created)
    }

    async fn forgot_password(&self, _body: &Value) -> Result<Value, ProviderError> {
        Ok(serde_json::json!({"status": "ok"}))
    }

    async fn verify_security_pin(&self, _body: &Value) -> Result<Value, ProviderError> {
        Ok(serde_json::json!({"valid": true}))
    }
}

/// Quote provider that answers from a fixed symbol -> price table.
pub struct MockQuoteProvider {
    pub prices: std::collections::HashMap<String, f64>,
}

impl MockQuoteProvider {
    #[allow(dead_code)]
    pub fn new(prices: std::collections::HashMap<String, f64>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        match self.prices.get(symbol) {
            Some(price) => Ok(Quote {
                symbol: symbol.to_string(),
                price: *price,
                previous_close: None,
                change_percent: None,
            }),
            None => Err(ProviderError::Status(404)),
        }
    }
}
