// Proxy endpoint modules
pub mod health;
pub mod invoice;
pub mod payment;
pub mod transaction;
pub mod user;
pub mod wallet;

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    config::Config,
    error::{AppError, Result},
    integrations::BitGoClient,
    network::Network,
    utils::clean_bearer_token,
};

/// Shared across handlers. Nothing here is request state: per-request
/// credentials and network selection live in the handler arguments, and the
/// upstream client is rebuilt from them on every call.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
}

/// Query parameters accepted by every proxy route.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub network: Option<String>,
    pub limit: Option<u32>,
}

// Extraction failures must come back in the same `{"error": ...}` shape as
// every other failure, so both extractors route their rejections through
// `AppError` instead of axum's plain-text defaults.

impl<S> FromRequestParts<S> for ProxyQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(query) = Query::<ProxyQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(query)
    }
}

/// JSON body extractor for the proxy handlers.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub fn require_bearer(headers: &HeaderMap) -> Result<String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("No bearer token provided".to_string()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid Authorization header".to_string()))?;
    let scheme_ok = auth_str
        .trim()
        .get(..7)
        .map(|prefix| prefix.eq_ignore_ascii_case("bearer "))
        .unwrap_or(false);
    if !scheme_ok {
        return Err(AppError::Auth(
            "Authorization scheme must be Bearer".to_string(),
        ));
    }

    let token = clean_bearer_token(auth_str);
    if token.is_empty() {
        return Err(AppError::Auth("Bearer token is empty".to_string()));
    }
    Ok(token)
}

/// Resolves the bearer token and network selector into a per-request
/// upstream client. Fails before any network I/O on auth or selector
/// problems.
pub fn upstream_client(
    state: &AppState,
    headers: &HeaderMap,
    network: Option<&str>,
) -> Result<(BitGoClient, Network)> {
    let token = require_bearer(headers)?;
    let network = Network::from_selector(network)?;
    let client = BitGoClient::new(state.http.clone(), &state.config, &token, network)?;
    Ok((client, network))
}
