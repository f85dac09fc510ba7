//! In-memory encoding per output format

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageResult};

use crate::naming::SourceFormat;

/// Encodes `img` in `format`, returning the file bytes
pub(crate) fn encode(
    img: &DynamicImage,
    format: SourceFormat,
    jpeg_quality: u8,
) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();

    match format {
        SourceFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, jpeg_quality))?;
        }
        SourceFormat::Png => {
            img.write_with_encoder(PngEncoder::new_with_quality(
                &mut buf,
                CompressionType::Best,
                PngFilter::Adaptive,
            ))?;
        }
        SourceFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
        }
    }

    Ok(buf)
}

/// Scales `img` to `width`, keeping the aspect ratio
pub(crate) fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let scaled = u64::from(img.height()) * u64::from(width) / u64::from(img.width());
    let height = scaled.max(1) as u32;
    img.resize_exact(width, height, FilterType::Lanczos3)
}
