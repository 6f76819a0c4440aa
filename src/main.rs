use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use dotenv::dotenv;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

mod api_client;
mod config;
mod domain;
mod errors;
mod events;
mod format;
mod infra;
mod usecases;

use crate::api_client::{BackendProvider, ReqwestBackendProvider, ReqwestQuoteProvider};
use crate::config::{ApiConfig, ConfigOptions};
use crate::domain::models::{Holding, Investment};
use crate::errors::{ProviderError, ValidationError};
use crate::events::{AppEvent, EventBus};
use crate::format::{format_currency, format_percent};
use crate::infra::file_cache::FileCacheStore;
use crate::usecases::fund_grouping::group_fund_companies;
use crate::usecases::portfolio_service::PortfolioService;
use crate::usecases::projection::{compute_lumpsum, compute_sip};

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn BackendProvider>,
    portfolio: Arc<PortfolioService>,
    bus: EventBus,
}

type HandlerError = (StatusCode, Json<Value>);

fn provider_error(e: ProviderError) -> HandlerError {
    match e {
        ProviderError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing bearer token"})),
        ),
        other => {
            error!(error = %other, "Upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": format!("Upstream request failed: {}", other)})),
            )
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, HandlerError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or_else(|| provider_error(ProviderError::Unauthorized))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionRequest {
    amount: f64,
    years: f64,
    expected_return: f64,
}

#[tracing::instrument(skip(state))]
async fn api_funds(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let raw = state
        .provider
        .fetch_fund_companies()
        .await
        .map_err(provider_error)?;
    let groups = group_fund_companies(&raw);
    // A non-array payload degrades to zero groups; flag it so the screen
    // can show a connectivity message instead of an empty list.
    let degraded = !raw.is_array() && groups.is_empty();
    if degraded {
        warn!("Mutual-fund listing had unexpected shape, returning empty result");
    }
    Ok(Json(json!({
        "count": groups.len(),
        "degraded": degraded,
        "companies": groups,
    })))
}

async fn api_projection_sip(
    Json(req): Json<ProjectionRequest>,
) -> Result<Json<Value>, HandlerError> {
    match compute_sip(req.amount, req.years, req.expected_return) {
        Ok(result) => Ok(Json(json!({
            "result": result,
            "formatted": {
                "futureValue": format_currency(result.future_value()),
                "totalReturns": format_currency(result.total_returns()),
            }
        }))),
        Err(e) => Err((StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()})))),
    }
}

async fn api_projection_lumpsum(
    Json(req): Json<ProjectionRequest>,
) -> Result<Json<Value>, HandlerError> {
    match compute_lumpsum(req.amount, req.years, req.expected_return) {
        Ok(result) => Ok(Json(json!({
            "result": result,
            "formatted": {
                "futureValue": format_currency(result.future_value()),
                "totalReturns": format_currency(result.total_returns()),
            }
        }))),
        Err(e) => Err((StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()})))),
    }
}

async fn api_get_portfolio(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, HandlerError> {
    let token = bearer_token(&headers)?;
    let loaded = state
        .portfolio
        .load_portfolio(&username, &token)
        .await
        .map_err(provider_error)?;

    let holdings: Vec<Value> = loaded
        .holdings
        .iter()
        .map(|h| {
            let valued = crate::usecases::valuation::value_holding(h);
            json!({
                "holding": h,
                "valuation": valued,
                "formatted": {
                    "currentValue": format_currency(valued.current_value),
                    "gainLoss": format_currency(valued.gain_loss),
                    "gainLossPercent": format_percent(valued.gain_loss_percent),
                }
            })
        })
        .collect();

    Ok(Json(json!({
        "source": loaded.source.as_str(),
        "holdings": holdings,
        "summary": loaded.summary,
        "formatted": {
            "totalInvestment": format_currency(loaded.summary.total_investment),
            "currentValue": format_currency(loaded.summary.current_value),
            "totalGainLoss": format_currency(loaded.summary.total_gain_loss),
            "totalGainLossPercent": format_percent(loaded.summary.total_gain_loss_percent),
        }
    })))
}

async fn api_add_holding(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
    Json(holding): Json<Holding>,
) -> Result<Json<Value>, HandlerError> {
    let token = bearer_token(&headers)?;
    if holding.symbol.trim().is_empty() {
        let e = ValidationError::MissingField("symbol".to_string());
        return Err((StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))));
    }
    let created = state
        .portfolio
        .add_holding(&username, &token, &holding)
        .await
        .map_err(provider_error)?;
    Ok(Json(json!({"created": created})))
}

async fn api_update_holding(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(holding): Json<Holding>,
) -> Result<Json<Value>, HandlerError> {
    let token = bearer_token(&headers)?;
    let updated = state
        .portfolio
        .update_holding(&username, &id, &token, &holding)
        .await
        .map_err(provider_error)?;
    Ok(Json(json!({"updated": updated})))
}

async fn api_delete_holding(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, HandlerError> {
    let token = bearer_token(&headers)?;
    state
        .portfolio
        .delete_holding(&username, &id, &token)
        .await
        .map_err(provider_error)?;
    Ok(Json(json!({"deleted": id})))
}

#[derive(Deserialize)]
struct InvestmentsQuery {
    #[serde(rename = "type")]
    investment_type: Option<String>,
}

async fn api_investments(
    State(state): State<AppState>,
    Query(q): Query<InvestmentsQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, HandlerError> {
    let token = bearer_token(&headers)?;
    let mut investments = state
        .provider
        .fetch_investments(&token)
        .await
        .map_err(provider_error)?;
    if let Some(wanted) = q.investment_type {
        investments.retain(|i| i.investment_type == wanted);
    }
    Ok(Json(json!({"investments": investments})))
}

async fn api_create_investment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(investment): Json<Investment>,
) -> Result<Json<Value>, HandlerError> {
    let token = bearer_token(&headers)?;
    let created = state
        .provider
        .create_investment(&token, &investment)
        .await
        .map_err(provider_error)?;
    state.bus.publish(AppEvent::InvestmentAdded {
        id: created.id.clone(),
        investment_type: created.investment_type.clone(),
        amount: created.amount,
    });
    Ok(Json(json!({"created": created})))
}

async fn api_forgot_password(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, HandlerError> {
    let response = state
        .provider
        .forgot_password(&body)
        .await
        .map_err(provider_error)?;
    Ok(Json(response))
}

async fn api_verify_pin(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, HandlerError> {
    let response = state
        .provider
        .verify_security_pin(&body)
        .await
        .map_err(provider_error)?;
    Ok(Json(response))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/funds", get(api_funds))
        .route("/api/projection/sip", post(api_projection_sip))
        .route("/api/projection/lumpsum", post(api_projection_lumpsum))
        .route(
            "/api/portfolio/{username}",
            get(api_get_portfolio).post(api_add_holding),
        )
        .route(
            "/api/portfolio/{username}/{id}",
            put(api_update_holding).delete(api_delete_holding),
        )
        .route(
            "/api/investments",
            get(api_investments).post(api_create_investment),
        )
        .route("/api/auth/forgot-password", post(api_forgot_password))
        .route("/api/auth/verify-pin", post(api_verify_pin))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let force_production = matches!(
        std::env::var("FINTRACK_FORCE_PRODUCTION").as_deref(),
        Ok("1") | Ok("true")
    );
    let config = ApiConfig::from_env(ConfigOptions { force_production });
    info!(base_url = %config.base_url, "Configured backend");

    let cache_dir =
        std::env::var("FINTRACK_CACHE_DIR").unwrap_or_else(|_| ".fintrack_cache".to_string());

    let provider: Arc<dyn BackendProvider> =
        Arc::new(ReqwestBackendProvider::new(config.clone()));
    let quotes = Arc::new(ReqwestQuoteProvider::new(config.clone()));
    let cache = Arc::new(FileCacheStore::new(cache_dir));
    let portfolio = Arc::new(PortfolioService::new(provider.clone(), quotes, cache));

    let bus = EventBus::default();
    let mut refresh_rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = refresh_rx.recv().await {
            let AppEvent::InvestmentAdded {
                id,
                investment_type,
                amount,
            } = event;
            info!(?id, investment_type = %investment_type, amount, "Investment added, dependent views refresh");
        }
    });

    let state = AppState {
        provider,
        portfolio,
        bus,
    };

    let app = build_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    serve(app, 3001).await;
    Ok(())
}

async fn serve(app: Router, port: u16) {
    // Try to bind to the requested port; if it's in use, try a few subsequent ports.
    let max_attempts = 10;
    for offset in 0..max_attempts {
        let try_port = port + offset;
        let addr = SocketAddr::from(([127, 0, 0, 1], try_port));
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!(%addr, "Listening");
                if let Err(e) = axum::serve(listener, app.clone()).await {
                    error!(error = %e, "Server failed while serving");
                }
                return;
            }
            Err(e) => {
                warn!(port = try_port, error = %e, "Port unavailable, trying next");
            }
        }
    }
    error!(
        "Failed to bind to any port in range {}..{}",
        port,
        port + max_attempts - 1
    );
}
