use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tolerant numeric read: accepts a JSON number, a numeric string with
/// optional thousands separators, or nothing. Anything unparsable is None.
pub fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let cleaned = s.trim().replace(',', "");
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}

// Numeric wire fields default to 0.0 instead of rejecting the record or
// letting NaN through to the UI.
fn de_f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_f64(raw.as_ref()).unwrap_or(0.0))
}

/// One portfolio position as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub purchase_price: f64,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub current_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One mutual-fund NAV record after validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundScheme {
    pub scheme_code: String,
    pub scheme_name: String,
    pub nav: f64,
    pub last_updated: String,
}

/// Raw scheme row as the backend sends it; every field may be missing
/// or malformed and is validated by the grouping engine.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawScheme {
    #[serde(default)]
    pub scheme_name: Option<String>,
    #[serde(default)]
    pub scheme_code: Option<String>,
    #[serde(default)]
    pub nav: Option<Value>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Raw company record from the mutual-fund listing endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCompany {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub schemes: Vec<RawScheme>,
}

/// Canonicalized group of schemes shown as one section in the fund list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyGroup {
    pub company_name: String,
    pub schemes: Vec<FundScheme>,
    pub last_updated: String,
}

/// Result of one Calculate action. Transient: replaced wholesale by the
/// next calculation, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ProjectionResult {
    #[serde(rename = "SIP")]
    Sip {
        monthly_amount: f64,
        total_investment: f64,
        future_value: f64,
        total_returns: f64,
        /// Duration in years.
        duration: f64,
        /// Expected annual return, percent.
        expected_return: f64,
    },
    #[serde(rename = "LUMPSUM")]
    Lumpsum {
        principal: f64,
        future_value: f64,
        total_returns: f64,
        duration: f64,
        expected_return: f64,
    },
}

impl ProjectionResult {
    pub fn future_value(&self) -> f64 {
        match self {
            ProjectionResult::Sip { future_value, .. } => *future_value,
            ProjectionResult::Lumpsum { future_value, .. } => *future_value,
        }
    }

    pub fn total_returns(&self) -> f64 {
        match self {
            ProjectionResult::Sip { total_returns, .. } => *total_returns,
            ProjectionResult::Lumpsum { total_returns, .. } => *total_returns,
        }
    }
}

/// Per-holding economics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub investment: f64,
    pub current_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
}

/// Best/worst performer reference inside a summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformerRef {
    pub symbol: String,
    pub name: String,
    pub gain_loss_percent: f64,
}

/// Aggregate view over a holding list. Always well-defined, including
/// for the empty portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_stocks: usize,
    pub total_investment: f64,
    pub current_value: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub best_performer: Option<PerformerRef>,
    pub worst_performer: Option<PerformerRef>,
}

/// Investment record from the investments collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub investment_type: String,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Latest quote from the third-party price provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub price: f64,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
}
