use crate::error::AppError;
use crate::models::image_types::{SelectedFile, VideoFrame};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Reads a file from disk the way a browser file picker would hand it over:
/// name, MIME type (from the extension, then from content sniffing) and bytes.
pub async fn read_selected_file(path: &Path) -> Result<SelectedFile, AppError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let mime_type = ImageFormat::from_path(path)
        .ok()
        .or_else(|| image::guess_format(&bytes).ok())
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string());

    Ok(SelectedFile::new(name, mime_type, bytes))
}

pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, b64)
}

/// Header-only probe; `None` when the format is unknown or corrupt.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Encodes an RGB8 camera frame as JPEG.
pub fn encode_frame_jpeg(frame: &VideoFrame, quality: u8) -> Result<Vec<u8>, AppError> {
    if frame.is_empty() {
        return Err(AppError::Capture("frame has zero dimensions".into()));
    }
    let expected = (frame.width as usize)
        .checked_mul(frame.height as usize)
        .and_then(|px| px.checked_mul(3))
        .ok_or_else(|| {
            AppError::Capture(format!("frame size {}x{} overflows", frame.width, frame.height))
        })?;
    if frame.rgb.len() != expected {
        return Err(AppError::Capture(format!(
            "frame buffer is {} bytes, expected {} for {}x{}",
            frame.rgb.len(),
            expected,
            frame.width,
            frame.height
        )));
    }

    let mut buf = Vec::with_capacity(expected / 8);
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)?;
    Ok(buf)
}
