//! Bill-payment API handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{
    codec::{BarcodeCodec, Checked, CodecOptions, MarkerPolicy, Warning},
    error::ThaiBillError,
    generate::{self, GenerateOptions, Generated},
    render::{self, RenderError},
    server::AppState,
};

/// Request body (POST) or query string (GET) for every bill endpoint.
#[derive(Debug, Deserialize)]
pub struct BarcodeRequest {
    /// BOT barcode text, space- or CR-separated
    pub barcode: String,
    /// Accept text without the leading `|`
    #[serde(default)]
    pub lenient: bool,
}

type ApiError = (StatusCode, String);

fn codec_options(state: &AppState, lenient: bool) -> CodecOptions {
    let mut options = state.config.codec;
    if lenient {
        options.marker_policy = MarkerPolicy::Lenient;
    }
    options
}

/// Bad input is the caller's fault; anything else is ours.
fn api_error(e: ThaiBillError) -> ApiError {
    let status = match &e {
        ThaiBillError::Codec(_)
        | ThaiBillError::Render(
            RenderError::EmptyPayload | RenderError::Unencodable(_) | RenderError::Qr(_),
        ) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %e, status = status.as_u16(), "request failed");
    (status, e.to_string())
}

fn warn_all(warnings: &[Warning]) {
    for warning in warnings {
        tracing::warn!(%warning, "barcode diagnostic");
    }
}

fn logged(generated: Generated) -> Json<Generated> {
    warn_all(&generated.warnings);
    Json(generated)
}

/// Handle GET /api/health.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "bootTime": state.boot_time }))
}

/// Handle POST /api/parse - parse and encode without rendering.
pub async fn parse(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BarcodeRequest>,
) -> Result<Json<Generated>, ApiError> {
    let options = GenerateOptions {
        codec: codec_options(&state, request.lenient),
        ..Default::default()
    };
    generate::generate(&request.barcode, &options)
        .map(logged)
        .map_err(api_error)
}

/// Handle POST /api/generate - payloads plus both images as data URLs.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BarcodeRequest>,
) -> Result<Json<Generated>, ApiError> {
    // Never write files on behalf of HTTP clients.
    let options = GenerateOptions {
        return_blob: true,
        codec: codec_options(&state, request.lenient),
        qr_style: state.config.qr_style,
        barcode_style: state.config.barcode_style,
        ..Default::default()
    };
    generate::generate_async(&request.barcode, &options)
        .await
        .map(logged)
        .map_err(api_error)
}

/// Handle GET /api/qr.png - render the EMV QR code.
pub async fn qr_png(
    State(state): State<Arc<AppState>>,
    Query(request): Query<BarcodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let codec = BarcodeCodec::new(codec_options(&state, request.lenient));
    let style = state.config.qr_style;

    // Move CPU-intensive work to blocking thread pool
    let png_bytes = tokio::task::spawn_blocking(move || {
        let Checked { value: bill, warnings } = codec.parse(&request.barcode)?;
        warn_all(&warnings);
        let payload = codec.encode_emv_qr(&bill)?;
        Ok::<_, ThaiBillError>(render::render_qr(payload.as_str(), &style)?)
    })
    .await
    .map_err(|e| api_error(ThaiBillError::Task(e.to_string())))?
    .map_err(api_error)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

/// Handle GET /api/barcode.png - render the Code 128 barcode.
pub async fn barcode_png(
    State(state): State<Arc<AppState>>,
    Query(request): Query<BarcodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let codec = BarcodeCodec::new(codec_options(&state, request.lenient));
    let style = state.config.barcode_style;

    let png_bytes = tokio::task::spawn_blocking(move || {
        let Checked { value: bill, warnings } = codec.parse(&request.barcode)?;
        warn_all(&warnings);
        let text = codec.encode_bot_barcode(&bill);
        warn_all(&text.warnings);
        let text = text.value;
        Ok::<_, ThaiBillError>(render::render_barcode(text.as_str(), &style)?)
    })
    .await
    .map_err(|e| api_error(ThaiBillError::Task(e.to_string())))?
    .map_err(api_error)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}
