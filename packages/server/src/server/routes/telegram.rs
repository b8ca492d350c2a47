//! Phone login API used by the demo page.
//!
//! `GET /telegram?act=send&phone=...`  push a login request
//! `GET /telegram?act=check&phone=...` poll for acceptance and fetch the profile

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct TelegramQuery {
    pub act: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Send,
    Check,
}

impl Action {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "send" => Some(Action::Send),
            "check" => Some(Action::Check),
            _ => None,
        }
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Run one workflow step and return its result as JSON.
///
/// Workflow failures are still `200 OK`; the body carries `status: "cancel"`
/// and the error text. Only malformed requests get `400`.
pub async fn telegram_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<TelegramQuery>,
) -> Response {
    let Some(action) = Action::parse(query.act.as_deref()) else {
        return bad_request(format!(
            "unknown act {:?}, expected \"send\" or \"check\"",
            query.act.unwrap_or_default()
        ));
    };

    let phone = match query.phone.as_deref().map(str::trim) {
        Some(phone) if !phone.is_empty() => phone.to_string(),
        _ => return bad_request("phone is required"),
    };

    debug!(?action, phone = %phone, "telegram api call");

    let cancel = state.shutdown.child_token();
    let result = match action {
        Action::Send => state.telegram.send_push_with_cancel(&phone, &cancel).await,
        Action::Check => {
            state
                .telegram
                .check_acceptance_with_cancel(&phone, &cancel)
                .await
        }
    };

    (StatusCode::OK, Json(result)).into_response()
}
