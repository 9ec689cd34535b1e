use crate::error::AppError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a reduced-size copy of a source image.
pub trait Thumbnailer {
    fn generate(
        &self,
        source: &Path,
        dest: &Path,
        orientation: Option<u32>,
    ) -> Result<(), AppError>;
}

/// Fixed-width, orientation-corrected JPEG thumbnails.
#[derive(Debug, Clone)]
pub struct JpegThumbnailer {
    pub width: u32,
    pub quality: u8,
}

impl JpegThumbnailer {
    pub fn new(width: u32, quality: u8) -> Self {
        JpegThumbnailer { width, quality }
    }
}

impl Thumbnailer for JpegThumbnailer {
    fn generate(
        &self,
        source: &Path,
        dest: &Path,
        orientation: Option<u32>,
    ) -> Result<(), AppError> {
        if self.width == 0 {
            return Err(AppError::Generic("thumbnail width must be positive".into()));
        }

        log::trace!("Opening image for thumbnail generation: {:?}", source);
        let image = image::open(source)?;
        let image = apply_orientation(image, orientation);

        let (width, height) = image.dimensions();
        let height = scaled_height(width, height, self.width);
        let thumbnail = image.resize_exact(self.width, height, FilterType::Lanczos3).to_rgb8();

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                log::debug!("Created thumbnail directory: {:?}", parent);
            }
        }

        let mut writer = BufWriter::new(File::create(dest)?);
        JpegEncoder::new_with_quality(&mut writer, self.quality).encode(
            thumbnail.as_raw(),
            thumbnail.width(),
            thumbnail.height(),
            image::ColorType::Rgb8,
        )?;
        writer.flush()?;
        log::debug!("Thumbnail saved to: {:?}", dest);
        Ok(())
    }
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = (height as f64 * target_width as f64 / width as f64).round() as u32;
    scaled.max(1)
}

/// Rotates/mirrors so the pixels display upright for EXIF orientation 1-8.
pub fn apply_orientation(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(2) => img.fliph(),
        Some(3) => img.rotate180(),
        Some(4) => img.flipv(),
        Some(5) => img.rotate90().fliph(),
        Some(6) => img.rotate90(),
        Some(7) => img.rotate270().fliph(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}
