use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;

use crate::error::Result;

use super::{upstream_client, AppState, ProxyQuery};

/// GET /api/v1/user/me
///
/// Token verification: a successful relay proves the bearer token works
/// against the selected network. The profile payload is opaque to the proxy.
pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: ProxyQuery,
) -> Result<Json<Value>> {
    let (client, _network) = upstream_client(&state, &headers, query.network.as_deref())?;
    let profile = client.get_me().await?;
    Ok(Json(profile))
}
