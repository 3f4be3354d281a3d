// ABOUTME: Image resource handling for the slideforge application
// ABOUTME: Loads local or remote images into inline data URLs and decodes them back

use crate::errors::{ForgeError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;

const FETCH_ATTEMPTS: u32 = 3;
const FETCH_INITIAL_DELAY_MS: u64 = 1000;

/// Run `attempt` up to `attempts` times, doubling the pause between tries.
/// There is no pause after the final failure.
fn retry_with_backoff<T>(
    attempts: u32,
    initial_delay: Duration,
    mut sleep: impl FnMut(Duration),
    mut attempt: impl FnMut(u32) -> Result<T>,
) -> Result<T> {
    let mut delay = initial_delay;
    let mut tries = 1;
    loop {
        match attempt(tries) {
            Ok(value) => return Ok(value),
            Err(e) if tries >= attempts => return Err(e),
            Err(e) => {
                info!(
                    "Fetch attempt {} failed ({}), retrying in {} ms",
                    tries,
                    e,
                    delay.as_millis()
                );
                sleep(delay);
                delay *= 2;
                tries += 1;
            }
        }
    }
}

/// An image that can be either a local file or a remote URL.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub path: String,
    pub is_remote: bool,
}

impl ImageSource {
    /// Create a new ImageSource from a path string.
    /// The path can be either a local file path or a URL.
    pub fn new(path: &str) -> Self {
        let is_remote = path.starts_with("http://") || path.starts_with("https://");
        Self {
            path: path.to_string(),
            is_remote,
        }
    }

    /// Get the raw bytes of the image.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        if self.is_remote {
            self.fetch_remote_bytes()
        } else {
            self.read_local_bytes()
        }
    }

    /// Load the image and encode it as an inline `data:` URL.
    pub fn to_data_url(&self) -> Result<String> {
        let bytes = self.bytes()?;
        let format = image::guess_format(&bytes).map_err(|e| {
            ForgeError::InvalidImage(format!("{} is not a recognised image: {}", self.path, e))
        })?;
        Ok(encode_data_url(mime_for(format), &bytes))
    }

    /// Fetch content from a remote URL with retry capability
    fn fetch_remote_bytes(&self) -> Result<Vec<u8>> {
        info!("Fetching remote image: {}", self.path);

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(ForgeError::FetchError)?;

        retry_with_backoff(
            FETCH_ATTEMPTS,
            Duration::from_millis(FETCH_INITIAL_DELAY_MS),
            std::thread::sleep,
            |_| {
                let response = client.get(&self.path).send().map_err(ForgeError::FetchError)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ForgeError::ValidationError(format!("HTTP error: {}", status)));
                }
                response
                    .bytes()
                    .map(|b| b.to_vec())
                    .map_err(ForgeError::FetchError)
            },
        )
    }

    fn read_local_bytes(&self) -> Result<Vec<u8>> {
        info!("Reading local image: {}", self.path);
        let path = Path::new(&self.path);
        if !path.exists() {
            return Err(ForgeError::ValidationError(format!(
                "Image not found: {}",
                self.path
            )));
        }
        Ok(fs::read(path)?)
    }
}

fn mime_for(format: image::ImageFormat) -> &'static str {
    match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::Gif => "image/gif",
        image::ImageFormat::WebP => "image/webp",
        image::ImageFormat::Bmp => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its mime type and payload bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ForgeError::InvalidImage("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ForgeError::InvalidImage("data URL has no payload".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ForgeError::InvalidImage("data URL is not base64 encoded".to_string()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ForgeError::InvalidImage(format!("bad base64 payload: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

/// Decode a slide's inline image into pixels.
pub fn decode_image(data_url: &str) -> Result<DynamicImage> {
    let (_, bytes) = decode_data_url(data_url)?;
    Ok(image::load_from_memory(&bytes)?)
}
