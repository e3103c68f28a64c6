//! HTTP surface
//!
//! A thin warp layer over the engines: every handler resolves the caller's
//! identity, calls one engine operation, and serializes the result. All
//! replies carry `ok`; failures serialize as `{ok: false, error: KIND}` with
//! a status matching the error kind. No business rule lives here.

pub mod routes;

use crate::core::{LedgerStore, SellEngine, TradeEngine};
use crate::types::EconomyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use warp::http::StatusCode;

pub use routes::routes;

/// Shared handle the route filters clone into each handler
#[derive(Clone)]
pub struct Api {
    pub sell: Arc<SellEngine>,
    pub trade: Arc<TradeEngine>,
    pub ledger: LedgerStore,
}

/// Identity carried in the query string of GET endpoints
#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    #[serde(rename = "playerId", default)]
    pub player_id: String,
}

/// Wire shape of a failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellStatusReply {
    pub ok: bool,
    pub sold_today: u32,
    pub remaining: u32,
    pub limit: u32,
    #[serde(rename = "resetAtISO")]
    pub reset_at_iso: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReply {
    pub ok: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub credited: rust_decimal::Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellReply {
    pub ok: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub credited: rust_decimal::Decimal,
    pub sold_count: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: rust_decimal::Decimal,
    pub owned_counts: BTreeMap<crate::types::CardId, u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletReply {
    pub ok: bool,
    pub player_id: String,
    pub display_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: rust_decimal::Decimal,
    pub owned_counts: BTreeMap<crate::types::CardId, u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionLimits {
    pub selection: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReply {
    pub ok: bool,
    pub session: crate::types::TradeSession,
    pub limits: SelectionLimits,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectReply {
    pub ok: bool,
    pub new_stage: crate::types::TradeStage,
    pub session: crate::types::TradeSession,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReply {
    pub ok: bool,
    pub stage: crate::types::TradeStage,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenReply {
    pub ok: bool,
    pub session_id: String,
    pub stage: crate::types::TradeStage,
}

/// HTTP status for an error kind
pub fn status_of(error: &EconomyError) -> StatusCode {
    match error {
        EconomyError::PlayerNotFound { .. } | EconomyError::SessionNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        EconomyError::NotParticipant { .. } => StatusCode::FORBIDDEN,
        EconomyError::InvalidStage { .. } => StatusCode::CONFLICT,
        EconomyError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Serialize an engine result, mapping errors to `{ok:false, error}` replies
pub fn respond<T: Serialize>(
    result: Result<T, EconomyError>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    match result {
        Ok(reply) => Ok(warp::reply::with_status(
            warp::reply::json(&reply),
            StatusCode::OK,
        )),
        Err(error) => {
            let status = status_of(&error);
            if status == StatusCode::SERVICE_UNAVAILABLE {
                tracing::error!(error = %error, "request failed on storage");
            } else {
                tracing::debug!(error = %error, "request rejected");
            }
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorBody {
                    ok: false,
                    error: error.kind(),
                    message: error.to_string(),
                }),
                status,
            ))
        }
    }
}
