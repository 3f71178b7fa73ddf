//! Notification email relay.

use axum::{Json, extract::State};
use kirana_core::Email;
use serde::Deserialize;
use serde_json::{Value, json};

use super::ApiJson;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Send an HTML email through the configured relay.
#[tracing::instrument(skip(state, body))]
pub async fn send(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendEmailRequest>,
) -> Result<Json<Value>> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(to), Some(subject), Some(html)) =
        (present(body.to), present(body.subject), present(body.html))
    else {
        return Err(AppError::Validation(
            "Missing required fields: to, subject, html".to_string(),
        ));
    };

    let to = Email::parse(&to)?;
    state.mailer()?.send_html(&to, subject.trim(), &html).await?;

    Ok(Json(json!({ "success": true })))
}
