//! Background acquisition.
//!
//! Fetching the background is the only asynchronous step of a generation
//! call. [`acquire`] awaits the source, then decodes synchronously; either
//! the whole image is available or the call fails before anything is drawn.

use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;

use image::RgbaImage;

use crate::error::LoadError;

/// A decoded background raster. Immutable once built.
#[derive(Clone, Debug)]
pub struct BackgroundImage {
    pixels: RgbaImage,
}

impl BackgroundImage {
    /// Decode an encoded raster (JPEG or PNG).
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `None` when either dimension is zero.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        let (w, h) = self.pixels.dimensions();
        (w > 0 && h > 0).then_some((w, h))
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Where the background bytes come from.
pub trait BackgroundSource {
    /// Fetch the encoded background.
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>, LoadError>> + Send;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

/// Reads the first existing file among its candidates.
///
/// The background ships under one logical name in more than one spelling
/// (`cert.jpg`, `cert.jpeg`), so a source may list several paths.
#[derive(Clone, Debug)]
pub struct FileSource {
    candidates: Vec<PathBuf>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    /// Try `paths` in order.
    pub fn with_candidates<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

impl BackgroundSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        for path in &self.candidates {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    log::debug!("background: read {} bytes from {}", bytes.len(), path.display());
                    return Ok(bytes);
                }
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(LoadError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }
        Err(LoadError::Missing {
            tried: self.describe(),
        })
    }

    fn describe(&self) -> String {
        self.candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Bytes already in memory (uploads, embedded assets, tests).
#[derive(Clone, Debug)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl BackgroundSource for MemorySource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Fetch and decode a background.
pub async fn acquire<S: BackgroundSource>(source: &S) -> Result<BackgroundImage, LoadError> {
    let bytes = source.fetch().await?;
    if bytes.is_empty() {
        return Err(LoadError::Empty(source.describe()));
    }
    let background = BackgroundImage::decode(&bytes)?;
    log::info!(
        "background: {} decoded at {}x{}",
        source.describe(),
        background.width(),
        background.height()
    );
    Ok(background)
}

// ===================================================================
// Tests
// ===================================================================
