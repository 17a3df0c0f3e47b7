//! Server state and configuration.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::CodecOptions;
use crate::render::{BarcodeStyle, QrStyle};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Codec options applied unless a request asks for lenient parsing
    pub codec: CodecOptions,
    pub qr_style: QrStyle,
    pub barcode_style: BarcodeStyle,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            codec: CodecOptions::default(),
            qr_style: QrStyle::default(),
            barcode_style: BarcodeStyle::default(),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot, reported by the health endpoint.
    pub boot_time: u64,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { config, boot_time }
    }
}
