//! Raster assets: clinic logo, signature and exam images.
//!
//! Sources that are not already decoded are fetched through an
//! [`AssetLoader`]. Each fetch is bounded by the configured timeout so a slow
//! store degrades to "skip" instead of stalling the report.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Encoded raster bytes with their pixel size.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Sniff the format and read the real pixel dimensions from the header.
    pub fn from_bytes(bytes: Vec<u8>, label: &str) -> Result<Self, Error> {
        let decode_err = |reason: String| Error::ImageDecode {
            label: label.to_string(),
            reason,
        };
        let format = match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
            Ok(image::ImageFormat::Png) => ImageFormat::Png,
            Ok(other) => return Err(decode_err(format!("unsupported format {other:?}"))),
            Err(e) => return Err(decode_err(e.to_string())),
        };
        let reader = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| decode_err(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(decode_err("zero-sized image".to_string()));
        }
        Ok(Self {
            bytes,
            width,
            height,
            format,
        })
    }
}

/// Where an image comes from.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "String")]
pub enum ImageSource {
    Decoded(DecodedImage),
    /// `data:image/png;base64,...`
    DataUrl(String),
    /// URL or path resolved by the [`AssetLoader`].
    Location(String),
}

impl From<String> for ImageSource {
    fn from(value: String) -> Self {
        if value.starts_with("data:") {
            ImageSource::DataUrl(value)
        } else {
            ImageSource::Location(value)
        }
    }
}

impl From<DecodedImage> for ImageSource {
    fn from(value: DecodedImage) -> Self {
        ImageSource::Decoded(value)
    }
}

/// Fetches the raw bytes behind an [`ImageSource::Location`].
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, Error>;
}

/// Reads locations as file paths, relative ones against `root`.
#[derive(Clone, Debug, Default)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = location.strip_prefix("file://").unwrap_or(location);
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl AssetLoader for FsAssetLoader {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, Error> {
        let path = self.resolve(location);
        tokio::fs::read(&path).await.map_err(|e| Error::AssetLoad {
            label: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Loader for callers that only ever pass decoded images or data URLs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRemoteAssets;

#[async_trait]
impl AssetLoader for NoRemoteAssets {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, Error> {
        Err(Error::AssetLoad {
            label: location.to_string(),
            reason: "remote assets are not available".to_string(),
        })
    }
}

/// Decode the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, Error> {
    let load_err = |reason: &str| Error::AssetLoad {
        label: "data URL".to_string(),
        reason: reason.to_string(),
    };
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| load_err("missing data: prefix"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| load_err("missing payload separator"))?;
    if !meta.ends_with(";base64") {
        return Err(load_err("only base64 data URLs are supported"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| load_err(&e.to_string()))
}

/// Resolve a source into a probed image. Remote fetches are awaited in place
/// and bounded by `timeout`.
pub async fn resolve(
    source: &ImageSource,
    label: &str,
    loader: &dyn AssetLoader,
    timeout: Duration,
) -> Result<DecodedImage, Error> {
    match source {
        ImageSource::Decoded(img) => {
            // Trust the bytes, not the declared size.
            let probed = DecodedImage::from_bytes(img.bytes.clone(), label)?;
            if (probed.width, probed.height) != (img.width, img.height) {
                log::debug!(
                    "{label}: declared {}x{} but header says {}x{}",
                    img.width,
                    img.height,
                    probed.width,
                    probed.height
                );
            }
            Ok(probed)
        }
        ImageSource::DataUrl(url) => DecodedImage::from_bytes(decode_data_url(url)?, label),
        ImageSource::Location(location) => {
            let t0 = std::time::Instant::now();
            let bytes = tokio::time::timeout(timeout, loader.fetch(location))
                .await
                .map_err(|_| Error::AssetTimeout {
                    label: label.to_string(),
                    after: timeout,
                })?
                .map_err(|e| as_asset_error(e, label))?;
            log::debug!(
                "Fetched {label} from {location} ({} bytes) in {:.1}ms",
                bytes.len(),
                t0.elapsed().as_secs_f64() * 1000.0
            );
            DecodedImage::from_bytes(bytes, label)
        }
    }
}

/// Loader failures of any kind are reported as asset-level errors so the
/// composer can fall back instead of aborting.
fn as_asset_error(err: Error, label: &str) -> Error {
    if err.is_recoverable() {
        return err;
    }
    Error::AssetLoad {
        label: label.to_string(),
        reason: err.to_string(),
    }
}
