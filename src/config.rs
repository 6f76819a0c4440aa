use chrono::Utc;

const PROD_BASE_URL: &str = "https://api.fintracker.app";
const DEV_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_QUOTE_BASE_URL: &str = "https://quotes.fintracker.app";

/// Endpoint paths, relative to the backend base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub mutual_fund_companies: String,
    pub investments: String,
    pub stock_portfolio: String,
    pub forgot_password: String,
    pub verify_security_pin: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mutual_fund_companies: "/api/mutual-funds/companies".to_string(),
            investments: "/api/investments".to_string(),
            stock_portfolio: "/api/stock-portfolio".to_string(),
            forgot_password: "/api/auth/forgot-password".to_string(),
            verify_security_pin: "/api/auth/verify-pin".to_string(),
        }
    }
}

/// Options recognized when building a config from the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Always target the production backend, regardless of environment.
    pub force_production: bool,
}

/// Backend endpoint configuration, injected into the API client at
/// construction. There is no module-level state: callers decide which
/// config an instance gets.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub quote_base_url: String,
    pub endpoints: Endpoints,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, quote_base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            quote_base_url: trim_trailing_slash(quote_base_url.into()),
            endpoints: Endpoints::default(),
        }
    }

    /// Build from environment variables (dotenv is loaded by the caller).
    ///
    /// `FINTRACK_BASE_URL` overrides everything; otherwise `FINTRACK_ENV`
    /// selects between the dev and production defaults, and
    /// `force_production` wins over both.
    pub fn from_env(options: ConfigOptions) -> Self {
        let base_url = if let Ok(url) = std::env::var("FINTRACK_BASE_URL") {
            url
        } else if options.force_production {
            PROD_BASE_URL.to_string()
        } else {
            match std::env::var("FINTRACK_ENV").as_deref() {
                Ok("production") => PROD_BASE_URL.to_string(),
                _ => DEV_BASE_URL.to_string(),
            }
        };
        let quote_base_url = std::env::var("FINTRACK_QUOTE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_QUOTE_BASE_URL.to_string());
        Self::new(base_url, quote_base_url)
    }

    /// Mutual-fund listing URL with a cache-busting `t` timestamp.
    pub fn fund_companies_url(&self) -> String {
        format!(
            "{}{}?t={}",
            self.base_url,
            self.endpoints.mutual_fund_companies,
            Utc::now().timestamp_millis()
        )
    }

    pub fn investments_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.investments)
    }

    pub fn portfolio_url(&self, username: &str) -> String {
        format!("{}{}/{}", self.base_url, self.endpoints.stock_portfolio, username)
    }

    pub fn portfolio_entry_url(&self, username: &str, id: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url, self.endpoints.stock_portfolio, username, id
        )
    }

    pub fn forgot_password_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.forgot_password)
    }

    pub fn verify_security_pin_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.verify_security_pin)
    }

    pub fn quote_url(&self, symbol: &str) -> String {
        format!("{}/quote/{}", self.quote_base_url, symbol)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_production_overrides_env() {
        // Explicit options object, no env reads needed.
        let cfg = ApiConfig::new(PROD_BASE_URL, DEFAULT_QUOTE_BASE_URL);
        assert_eq!(cfg.portfolio_url("alice"), format!("{}/api/stock-portfolio/alice", PROD_BASE_URL));

        let opts = ConfigOptions { force_production: true };
        std::env::remove_var("FINTRACK_BASE_URL");
        std::env::remove_var("FINTRACK_ENV");
        let cfg = ApiConfig::from_env(opts);
        assert_eq!(cfg.base_url, PROD_BASE_URL);
    }

    #[test]
    fn fund_companies_url_carries_cache_buster() {
        let cfg = ApiConfig::new("http://localhost:5000/", "http://quotes");
        let url = cfg.fund_companies_url();
        assert!(url.starts_with("http://localhost:5000/api/mutual-funds/companies?t="));
    }

    #[test]
    fn entry_url_includes_username_and_id() {
        let cfg = ApiConfig::new("http://b", "http://q");
        assert_eq!(
            cfg.portfolio_entry_url("bob", "42"),
            "http://b/api/stock-portfolio/bob/42"
        );
        assert_eq!(cfg.quote_url("TCS"), "http://q/quote/TCS");
    }
}
