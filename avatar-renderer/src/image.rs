//! Image decoding.
//!
//! Turns uploaded files, asset bytes and `data:` URLs into [`Raster`]s.

use avatar_core::Raster;
use base64::Engine;

use crate::error::{RenderError, RenderResult};

/// Image formats recognised by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Unknown
        }
    }
}

/// Whether a MIME type advertises an image, as a file picker's
/// `accept="image/*"` filter would.
#[must_use]
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Decode image bytes into an RGBA raster.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the bytes are empty or not a supported image.
pub fn decode_image(data: &[u8]) -> RenderResult<Raster> {
    if data.is_empty() {
        return Err(RenderError::Decode("empty input".to_string()));
    }

    let format = ImageFormat::from_magic_bytes(data);
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Decode(format!("{format:?}: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::trace!("Decoded {format:?} image {width}x{height}");

    Ok(Raster::from_rgba(width, height, rgba.into_raw())?)
}

/// Decode an uploaded file, given either as raw image bytes or as a `data:`
/// URL produced by a browser file reader.
///
/// # Errors
///
/// Returns an error if the payload is not a decodable image.
pub fn decode_upload(data: &[u8]) -> RenderResult<Raster> {
    if data.starts_with(b"data:") {
        let uri = std::str::from_utf8(data)
            .map_err(|e| RenderError::Resource(format!("data URI is not UTF-8: {e}")))?;
        decode_data_uri(uri)
    } else {
        decode_image(data)
    }
}

/// Decode a `data:` URL, such as the one a browser file reader produces.
///
/// Supports `data:image/png;base64,iVBORw0KGgo...` and percent-encoded payloads.
///
/// # Errors
///
/// Returns an error if the URL is malformed or the image cannot be decoded.
pub fn decode_data_uri(uri: &str) -> RenderResult<Raster> {
    decode_image(&data_uri_bytes(uri)?)
}

/// Extract the payload bytes of a `data:` URL.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URL is malformed.
pub fn data_uri_bytes(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if metadata.split(';').any(|part| part == "base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Ok(out)
}
