use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use tracing::warn;

/// Formats browsers cannot render natively; converted to JPEG before storage.
pub const CONSTRAINED_EXTENSIONS: &[&str] = &["heic", "heif"];

const JPEG_QUALITY: u8 = 85;

pub fn needs_normalization(extension: &str) -> bool {
    CONSTRAINED_EXTENSIONS.contains(&extension)
}

/// Best-effort conversion of HEIC/HEIF payloads to a browser-renderable JPEG.
///
/// Conversion failures keep the original bytes and extension; the upload
/// continues either way.
pub async fn normalize_image(data: Bytes, extension: String) -> (Bytes, String) {
    if !needs_normalization(&extension) {
        return (data, extension);
    }

    let input = data.clone();
    let converted = tokio::task::spawn_blocking(move || convert_to_jpeg(&input)).await;

    match converted {
        Ok(Ok(jpeg)) => (Bytes::from(jpeg), "jpg".to_string()),
        Ok(Err(err)) => {
            warn!("Image conversion failed, keeping original payload: {}", err);
            (data, extension)
        }
        Err(err) => {
            warn!("Image conversion task failed: {}", err);
            (data, extension)
        }
    }
}

fn convert_to_jpeg(data: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(data)?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([200, 40, 40]),
        ));
        let mut out = Vec::new();
        img.write_with_encoder(PngEncoder::new(&mut out)).unwrap();
        out
    }

    #[tokio::test]
    async fn non_constrained_formats_pass_through() {
        let data = Bytes::from_static(b"not an image");
        let (out, ext) = normalize_image(data.clone(), "png".to_string()).await;
        assert_eq!(out, data);
        assert_eq!(ext, "png");
    }

    #[tokio::test]
    async fn decodable_payload_becomes_jpeg() {
        let (out, ext) = normalize_image(Bytes::from(png_bytes()), "heic".to_string()).await;
        assert_eq!(ext, "jpg");
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 4);
        assert!(matches!(
            image::guess_format(&out).unwrap(),
            image::ImageFormat::Jpeg
        ));
    }

    #[tokio::test]
    async fn undecodable_payload_keeps_original_bytes() {
        let data = Bytes::from_static(b"\x00\x01\x02 definitely not heic");
        let (out, ext) = normalize_image(data.clone(), "heif".to_string()).await;
        assert_eq!(out, data);
        assert_eq!(ext, "heif");
    }
}
