use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use qrcode::{QrCode, render::svg};
use serde::Deserialize;
use url::Url;

use qrdrop_types::{Transfer, TransferKind};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::transfers::new_transfer;

#[derive(Debug, Deserialize)]
pub struct QrQuery {
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    pub text: Option<String>,
}

/// What the QR code should point at.
///
/// URLs are encoded as-is so scanning opens them directly; text goes through
/// the `/text` page so the receiving device can copy it.
pub fn qr_target(transfer: &Transfer, public_url: &Url) -> Result<String, ApiError> {
    match transfer.kind() {
        TransferKind::Url => Ok(transfer.content().to_string()),
        TransferKind::Text => {
            let mut target = public_url
                .join("text")
                .map_err(|e| anyhow::anyhow!("Bad public URL {}: {}", public_url, e))?;
            target.query_pairs_mut().append_pair("text", transfer.content());
            Ok(target.into())
        }
    }
}

/// Rendered edge length in pixels; longer payloads get a bigger code.
pub fn qr_size(target: &str) -> u32 {
    match target.len() {
        0..=200 => 250,
        201..=400 => 300,
        _ => 500,
    }
}

pub fn render_svg(target: &str) -> Result<String, ApiError> {
    let code = QrCode::new(target.as_bytes())
        .map_err(|e| ApiError::bad_request(format!("QR generation failed: {}", e)))?;

    let size = qr_size(target);
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#FFFFFF"))
        .build())
}

/// GET /qr: no login needed, nothing is stored.
pub async fn get_qr(
    State(state): State<AppState>,
    Query(query): Query<QrQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let transfer = new_transfer(&query.kind, &query.content, Utc::now())?;
    let target = qr_target(&transfer, &state.public_url)?;
    let svg = render_svg(&target)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// GET /text: landing page for scanned text codes.
pub async fn get_text(Query(query): Query<TextQuery>) -> Result<impl IntoResponse, ApiError> {
    let text = query
        .text
        .ok_or_else(|| ApiError::bad_request("No text found in URL"))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
