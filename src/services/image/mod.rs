use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use png::{BitDepth, ColorType, Decoder, Encoder};

use crate::{
    error::{AppError, Result},
    services::scheduler::types::{DecodedImage, Rgb},
};

/// Component B: pure image codec, no failure beyond "malformed input → `BadImage`".
/// Decodes a base64-encoded PNG (the wire format projects are stored and submitted in,
/// §6) into an addressable RGB grid, and serializes the reverse direction.
pub fn decode_base64_png(base64_data: &str) -> Result<DecodedImage> {
    let bytes = STANDARD
        .decode(base64_data.trim())
        .map_err(|e| AppError::BadImage(format!("invalid base64: {e}")))?;
    decode_png_bytes(&bytes)
}

pub fn decode_png_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let decoder = Decoder::new(Cursor::new(bytes));
    let mut reader = decoder
        .read_info()
        .map_err(|e| AppError::BadImage(format!("invalid PNG: {e}")))?;

    let mut buffer = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buffer)
        .map_err(|e| AppError::BadImage(format!("invalid PNG frame: {e}")))?;

    if info.bit_depth != BitDepth::Eight {
        return Err(AppError::BadImage(
            "only 8-bit PNG images are supported".into(),
        ));
    }

    let channels = match info.color_type {
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Indexed => {
            return Err(AppError::BadImage(
                "indexed-color PNG images are not supported".into(),
            ));
        }
    };

    let data = &buffer[..info.buffer_size()];
    let mut pixels = Vec::with_capacity((info.width * info.height) as usize);
    for chunk in data.chunks_exact(channels) {
        let rgb = match channels {
            1 | 2 => Rgb(chunk[0], chunk[0], chunk[0]),
            _ => Rgb(chunk[0], chunk[1], chunk[2]),
        };
        pixels.push(rgb);
    }

    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

pub fn encode_rgb_png(width: u32, height: u32, pixels: &[Rgb]) -> Result<Vec<u8>> {
    if pixels.len() != (width * height) as usize {
        return Err(AppError::BadImage(
            "pixel count does not match width * height".into(),
        ));
    }

    let mut raw = Vec::with_capacity(pixels.len() * 3);
    for Rgb(r, g, b) in pixels {
        raw.push(*r);
        raw.push(*g);
        raw.push(*b);
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = Encoder::new(Cursor::new(&mut png_data), width, height);
        encoder.set_color(ColorType::Rgb);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::InternalServerError(format!("PNG header error: {e}")))?;
        writer
            .write_image_data(&raw)
            .map_err(|e| AppError::InternalServerError(format!("PNG write error: {e}")))?;
    }

    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_round_trips_rgb_pixels() {
        let pixels = vec![Rgb(255, 0, 0), Rgb(0, 255, 0), Rgb(0, 0, 255), Rgb(1, 2, 3)];
        let png_bytes = encode_rgb_png(2, 2, &pixels).unwrap();

        let decoded = decode_png_bytes(&png_bytes).unwrap();
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.height, 2);
        assert_eq!(decoded.pixels, pixels);
    }

    #[test]
    fn decode_rejects_malformed_base64() {
        let err = decode_base64_png("not valid base64!!!").unwrap_err();
        assert!(matches!(err, AppError::BadImage(_)));
    }

    #[test]
    fn decode_rejects_non_png_bytes() {
        let bytes = STANDARD.encode(b"this is not a png");
        let err = decode_base64_png(&bytes).unwrap_err();
        assert!(matches!(err, AppError::BadImage(_)));
    }

    #[test]
    fn encode_rejects_mismatched_pixel_count() {
        let err = encode_rgb_png(2, 2, &[Rgb(0, 0, 0)]).unwrap_err();
        assert!(matches!(err, AppError::BadImage(_)));
    }
}
