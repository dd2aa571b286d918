use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use headers::Authorization;
use headers::authorization::Bearer;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::router::AppState;

fn key_matches(candidate: &str, expected: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Header: `x-admin-key: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?key=...`
///
/// An empty configured key rejects everything.
pub fn ensure_admin(
    expected: &str,
    headers: &HeaderMap,
    bearer: Option<&str>,
    query: Option<&str>,
) -> Result<(), Response> {
    if !expected.is_empty() {
        // 1) header: x-admin-key
        if let Some(hv) = headers.get("x-admin-key").and_then(|v| v.to_str().ok())
            && key_matches(hv, expected)
        {
            return Ok(());
        }

        // 2) header: Authorization: Bearer <key>
        if let Some(token) = bearer
            && key_matches(token, expected)
        {
            return Ok(());
        }

        // 3) query: key=...
        if let Some(qs) = query {
            for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
                if k == "key" && key_matches(&v, expected) {
                    return Ok(());
                }
            }
        }
    }

    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": "UNAUTHORIZED", "message": "invalid or missing admin key"}})),
    )
        .into_response())
}

#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<AppState> for RequireAdminKey {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .ok();
        let bearer = bearer.as_ref().map(|TypedHeader(auth)| auth.token());
        ensure_admin(&state.admin_key, &parts.headers, bearer, parts.uri.query())?;
        Ok(Self)
    }
}
