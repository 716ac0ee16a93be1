//! Client for the remote QR image API (api.qrserver.com)
//!
//! QR codes are never rendered locally. The app builds a request URL from the
//! text and the image parameters, and the service answers with PNG bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Parameters sent with every image request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrImageSettings {
    pub endpoint: String,
    /// Edge length in pixels; the image is always square.
    pub size: u32,
    /// Background color, hex without `#`
    pub background: String,
    /// Foreground color, hex without `#`
    pub foreground: String,
    pub quiet_zone: u32,
    pub margin: u32,
}

impl Default for QrImageSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            size: 400,
            background: "ffffff".to_string(),
            foreground: "000000".to_string(),
            quiet_zone: 1,
            margin: 0,
        }
    }
}

/// URL of the rendered QR image for `data`
pub fn image_url(settings: &QrImageSettings, data: &str) -> String {
    let separator = if settings.endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{}{}size={}x{}&data={}&bgcolor={}&color={}&qzone={}&margin={}",
        settings.endpoint,
        separator,
        settings.size,
        settings.size,
        urlencoding::encode(data),
        settings.background,
        settings.foreground,
        settings.quiet_zone,
        settings.margin,
    )
}

/// File name for a downloaded image, unique per millisecond
pub fn download_file_name(now: DateTime<Utc>) -> String {
    format!("qrcode-{}.png", now.timestamp_millis())
}

#[derive(Debug, Clone, Default)]
pub struct QrImageClient {
    http: reqwest::Client,
}

impl QrImageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the image bytes behind `image_ref`.
    pub async fn fetch(&self, image_ref: &str) -> AppResult<Vec<u8>> {
        let response = self.http.get(image_ref).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ImageFetch(format!(
                "{} returned {}",
                image_ref,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
