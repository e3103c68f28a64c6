//! Route filters
//!
//! One filter per endpoint, combined with `or`. Handlers stay mechanical:
//! decode, delegate to an engine, serialize via [`respond`].

use super::{
    respond, Api, DecisionReply, ErrorBody, IdentityQuery, OpenReply, PreviewReply, SelectReply,
    SelectionLimits, SellReply, SellStatusReply, StateReply, WalletReply,
};
use crate::core::SellItem;
use crate::types::{CardId, EconomyError, TradeDecision, TradeStage, SELECTION_LIMIT};
use serde::Deserialize;
use warp::Filter;

fn with_api(api: Api) -> impl Filter<Extract = (Api,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || api.clone())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SellBody {
    #[serde(default)]
    player_id: String,
    #[serde(default)]
    items: Vec<SellItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenBody {
    #[serde(default)]
    player_id: String,
    #[serde(default)]
    partner_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectBody {
    #[serde(default)]
    player_id: String,
    stage: TradeStage,
    #[serde(default)]
    cards: Vec<CardId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionBody {
    #[serde(default)]
    player_id: String,
    decision: TradeDecision,
}

/// Build the full route tree
pub fn routes(
    api: Api,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let sell_status = warp::get()
        .and(warp::path!("sell" / "status"))
        .and(warp::query::<IdentityQuery>())
        .and(with_api(api.clone()))
        .and_then(|q: IdentityQuery, api: Api| async move {
            respond(api.sell.sell_status(&q.player_id).map(|s| SellStatusReply {
                ok: true,
                sold_today: s.sold_today,
                remaining: s.remaining,
                limit: s.limit,
                reset_at_iso: s.reset_at,
            }))
        });

    let sell_preview = warp::post()
        .and(warp::path!("sell" / "preview"))
        .and(warp::body::json())
        .and(with_api(api.clone()))
        .and_then(|body: SellBody, api: Api| async move {
            respond(
                api.sell
                    .preview_sell(&body.items)
                    .map(|credited| PreviewReply { ok: true, credited }),
            )
        });

    let sell_execute = warp::post()
        .and(warp::path!("sell"))
        .and(warp::body::json())
        .and(with_api(api.clone()))
        .and_then(|body: SellBody, api: Api| async move {
            respond(
                api.sell
                    .execute_sell(&body.player_id, &body.items)
                    .map(|o| SellReply {
                        ok: true,
                        credited: o.credited,
                        sold_count: o.sold_count,
                        balance: o.new_balance,
                        owned_counts: o.owned_counts,
                    }),
            )
        });

    let wallet = warp::get()
        .and(warp::path!("wallet"))
        .and(warp::query::<IdentityQuery>())
        .and(with_api(api.clone()))
        .and_then(|q: IdentityQuery, api: Api| async move {
            let result = if q.player_id.is_empty() {
                Err(EconomyError::MissingIdentity)
            } else {
                api.ledger.get(&q.player_id).and_then(|entry| {
                    entry.ok_or_else(|| EconomyError::player_not_found(&q.player_id))
                })
            };
            respond(result.map(|entry| WalletReply {
                ok: true,
                player_id: entry.player_id,
                display_name: entry.display_name,
                balance: entry.balance,
                owned_counts: entry.owned_counts,
            }))
        });

    let trade_open = warp::post()
        .and(warp::path!("trade" / "open"))
        .and(warp::body::json())
        .and(with_api(api.clone()))
        .and_then(|body: OpenBody, api: Api| async move {
            respond(
                api.trade
                    .open_session(&body.player_id, &body.partner_id)
                    .map(|s| OpenReply {
                        ok: true,
                        session_id: s.session_id,
                        stage: s.stage,
                    }),
            )
        });

    let trade_state = warp::get()
        .and(warp::path!("trade" / String / "state"))
        .and(with_api(api.clone()))
        .and_then(|session_id: String, api: Api| async move {
            respond(api.trade.state(&session_id).map(|session| StateReply {
                ok: true,
                session,
                limits: SelectionLimits {
                    selection: SELECTION_LIMIT,
                },
            }))
        });

    let trade_select = warp::post()
        .and(warp::path!("trade" / String / "select"))
        .and(warp::body::json())
        .and(with_api(api.clone()))
        .and_then(|session_id: String, body: SelectBody, api: Api| async move {
            respond(
                api.trade
                    .select(&session_id, &body.player_id, body.stage, &body.cards)
                    .map(|session| SelectReply {
                        ok: true,
                        new_stage: session.stage,
                        session,
                    }),
            )
        });

    let trade_decision = warp::post()
        .and(warp::path!("trade" / String / "decision"))
        .and(warp::body::json())
        .and(with_api(api))
        .and_then(|session_id: String, body: DecisionBody, api: Api| async move {
            respond(
                api.trade
                    .decide(&session_id, &body.player_id, body.decision)
                    .map(|session| DecisionReply {
                        ok: true,
                        stage: session.stage,
                        message: format!("trade {}", session.stage),
                    }),
            )
        });

    sell_status
        .or(sell_preview)
        .or(sell_execute)
        .or(wallet)
        .or(trade_open)
        .or(trade_state)
        .or(trade_select)
        .or(trade_decision)
        .recover(handle_rejection)
}

/// Map body/route rejections to the same wire shape as engine errors
async fn handle_rejection(
    rejection: warp::Rejection,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    if rejection.is_not_found() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&ErrorBody {
                ok: false,
                error: "NOT_FOUND",
                message: "no such route".to_string(),
            }),
            warp::http::StatusCode::NOT_FOUND,
        ));
    }
    if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&ErrorBody {
                ok: false,
                error: "BAD_REQUEST",
                message: e.to_string(),
            }),
            warp::http::StatusCode::BAD_REQUEST,
        ));
    }
    Err(rejection)
}
