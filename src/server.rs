//! HTTP endpoint receiving button press notifications

use axum::{response::Json, routing::post, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::notify::BUTTON_PRESSED_PATH;

/// Slider value as posted by a client, either a JSON number or a numeric string
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SliderValue {
    Number(f64),
    Text(String),
}

impl SliderValue {
    /// Numeric value, `None` for a string that does not parse as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Body of `POST /buttonPressed`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ButtonPressedRequest {
    pub pan: SliderValue,
    pub volume: SliderValue,
}

/// Routes of the notification server
pub fn router() -> Router {
    Router::new().route(BUTTON_PRESSED_PATH, post(button_pressed))
}

/// Serve [`router`] on the given address until the process is stopped
pub async fn serve(bind_addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    log::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router()).await
}

async fn button_pressed(Json(request): Json<ButtonPressedRequest>) -> Json<Value> {
    match (request.pan.as_f64(), request.volume.as_f64()) {
        (Some(pan), Some(volume)) => log::info!("Button pressed: pan={} volume={}", pan, volume),
        _ => log::info!("Button pressed: {:?}", request),
    }

    Json(json!({ "success": true }))
}
