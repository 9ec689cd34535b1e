use crate::catalog;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::extractor;
use crate::grouper;
use crate::metadata::{caption_for, UngroupedPhoto};
use crate::thumbnail::Thumbnailer;
use crate::walker;
use std::path::Path;

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub written: usize,
    pub skipped_no_gps: usize,
    pub failed: usize,
    pub groups: usize,
}

enum Outcome {
    Accepted(UngroupedPhoto),
    NoGps,
}

/// Rebuilds the whole catalog from the originals directory.
///
/// Per-file failures are logged and skipped. Only a failure to publish the
/// catalog itself is returned as an error.
pub fn run(config: &AppConfig, thumbnailer: &dyn Thumbnailer) -> Result<RunSummary, AppError> {
    let mut summary = RunSummary::default();

    let paths = walker::find_images(config, &config.originals_directory);
    summary.discovered = paths.len();
    if paths.is_empty() {
        log::info!("No image files found in {:?}", config.originals_directory);
        catalog::write_catalog(&config.output_path, &[])?;
        return Ok(summary);
    }

    let mut photos: Vec<UngroupedPhoto> = Vec::with_capacity(paths.len());
    for path in &paths {
        log::info!("Processing {:?}...", path);
        match process_image(config, thumbnailer, path) {
            Ok(Outcome::Accepted(photo)) => {
                log::info!(
                    "  OK - {:.4}, {:.4}",
                    photo.position.latitude,
                    photo.position.longitude
                );
                photos.push(photo);
            }
            Ok(Outcome::NoGps) => {
                log::info!("  Skipping {:?} - no GPS data.", path);
                summary.skipped_no_gps += 1;
            }
            Err(e) => {
                log::warn!("  Error processing {:?}: {}", path, e);
                summary.failed += 1;
            }
        }
    }

    catalog::sort_by_date_desc(&mut photos);
    let records = grouper::assign_groups(photos);
    summary.written = records.len();
    summary.groups = records.iter().map(|r| r.group + 1).max().unwrap_or(0);

    catalog::write_catalog(&config.output_path, &records)?;
    log::info!(
        "Wrote {} photos ({} groups) to {:?}",
        summary.written,
        summary.groups,
        config.output_path
    );
    Ok(summary)
}

fn process_image(
    config: &AppConfig,
    thumbnailer: &dyn Thumbnailer,
    path: &Path,
) -> Result<Outcome, AppError> {
    let bytes = std::fs::read(path)?;
    let metadata = extractor::extract(&bytes)?;
    let Some(position) = metadata.position else {
        return Ok(Outcome::NoGps);
    };

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::Generic(format!("non UTF-8 file name: {:?}", path)))?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::Generic(format!("non UTF-8 file name: {:?}", path)))?
        .to_string();
    let thumb_name = format!("{}.jpg", id);

    thumbnailer.generate(
        path,
        &config.thumbnail_directory.join(&thumb_name),
        metadata.orientation,
    )?;

    Ok(Outcome::Accepted(UngroupedPhoto {
        source_path: url_join(&config.source_url_prefix, file_name),
        thumbnail_path: url_join(&config.thumbnail_url_prefix, &thumb_name),
        caption: caption_for(&id),
        id,
        position,
        capture_date: metadata.date,
        camera: metadata.camera,
    }))
}

fn url_join(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::load_catalog;
    use crate::extractor::tests::{ascii_field, dms_field, exif_block, lisbon_gps_fields};
    use crate::thumbnail::JpegThumbnailer;
    use exif::{Field, Tag};
    use image::codecs::jpeg::JpegEncoder;
    use image::{ColorType, RgbImage};
    use std::path::PathBuf;

    pub(crate) fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            originals_directory: root.join("originals"),
            thumbnail_directory: root.join("thumbs"),
            output_path: root.join("photo-data.json"),
            source_url_prefix: "/photos/originals".into(),
            thumbnail_url_prefix: "/photos/thumbs".into(),
            thumbnail_width: 40,
            thumbnail_quality: 80,
            allowed_extensions: ["jpg", "jpeg", "png", "webp", "tif", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_level: "info".into(),
        }
    }

    /// A decodable JPEG with `fields` embedded in an APP1 Exif segment.
    fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
        let img = RgbImage::from_pixel(64, 48, image::Rgb([20, 120, 200]));
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, 90)
            .encode(img.as_raw(), 64, 48, ColorType::Rgb8)
            .unwrap();

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend(exif_block(fields));
        let len = (payload.len() + 2) as u16;

        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
        out.extend(len.to_be_bytes());
        out.extend(payload);
        out.extend(&encoded[2..]);
        out
    }

    /// Northern/western hemisphere position with a capture date.
    fn gps_fields(lat: (u32, u32), lng: (u32, u32), date: &str) -> Vec<Field> {
        vec![
            dms_field(Tag::GPSLatitude, lat.0, lat.1, 0),
            ascii_field(Tag::GPSLatitudeRef, "N"),
            dms_field(Tag::GPSLongitude, lng.0, lng.1, 0),
            ascii_field(Tag::GPSLongitudeRef, "W"),
            ascii_field(Tag::DateTimeOriginal, date),
        ]
    }

    fn originals(root: &Path) -> PathBuf {
        let dir = root.join("originals");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn run_jpeg(config: &AppConfig) -> RunSummary {
        run(config, &JpegThumbnailer::new(config.thumbnail_width, config.thumbnail_quality)).unwrap()
    }

    #[test]
    fn missing_directory_writes_empty_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let summary = run_jpeg(&config);

        assert_eq!(summary, RunSummary::default());
        assert_eq!(std::fs::read_to_string(&config.output_path).unwrap(), "[]");
    }

    #[test]
    fn directory_without_images_writes_empty_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        std::fs::write(originals(tmp.path()).join("notes.txt"), b"hello").unwrap();

        run_jpeg(&config);

        assert!(load_catalog(&config.output_path).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_writes_empty_catalog() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let dir = originals(tmp.path());
        std::fs::write(dir.join("lisbon.jpg"), jpeg_with_exif(&lisbon_gps_fields())).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores directory permissions; nothing to check then
        let readable = std::fs::read_dir(&dir).is_ok();

        let result = run(&config, &FailingThumbnailer);
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert_eq!(result.unwrap(), RunSummary::default());
        assert_eq!(std::fs::read_to_string(&config.output_path).unwrap(), "[]");
    }

    #[test]
    fn builds_sorted_grouped_catalog_and_survives_bad_files() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let dir = originals(tmp.path());

        // The two Lisbon-area shots are a few km apart; Porto is ~270 km north.
        std::fs::write(
            dir.join("lisbon_tram.jpg"),
            jpeg_with_exif(&gps_fields((38, 42), (9, 9), "2024:05:01 10:00:00")),
        )
        .unwrap();
        let mut lisbon = lisbon_gps_fields();
        lisbon.push(ascii_field(Tag::DateTimeOriginal, "2024:05:03 18:00:00"));
        lisbon.push(ascii_field(Tag::Make, "Apple"));
        lisbon.push(ascii_field(Tag::Model, "Apple iPhone 15"));
        std::fs::write(dir.join("sintra-palace.JPG"), jpeg_with_exif(&lisbon)).unwrap();
        std::fs::write(
            dir.join("porto.jpeg"),
            jpeg_with_exif(&gps_fields((41, 9), (8, 37), "2024:01:01 12:00:00")),
        )
        .unwrap();
        std::fs::write(dir.join("corrupt.jpg"), b"not an image at all").unwrap();
        std::fs::write(
            dir.join("no_gps.jpg"),
            jpeg_with_exif(&[
                ascii_field(Tag::Make, "Canon"),
                ascii_field(Tag::Model, "EOS R5"),
                ascii_field(Tag::DateTimeOriginal, "2024:06:01 09:00:00"),
            ]),
        )
        .unwrap();

        let summary = run_jpeg(&config);
        assert_eq!(summary.discovered, 5);
        assert_eq!(summary.written, 3);
        assert_eq!(summary.skipped_no_gps, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.groups, 2);

        let records = load_catalog(&config.output_path).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["sintra-palace", "lisbon_tram", "porto"]);

        let sintra = &records[0];
        assert_eq!(sintra.source_path, "/photos/originals/sintra-palace.JPG");
        assert_eq!(sintra.thumbnail_path, "/photos/thumbs/sintra-palace.jpg");
        assert_eq!(sintra.caption, "sintra palace");
        assert_eq!(sintra.capture_date, "2024-05-03 18:00:00");
        assert_eq!(sintra.camera, "Apple iPhone 15");
        assert!(sintra.longitude < 0.0);

        assert_eq!(records[1].caption, "lisbon tram");
        assert_eq!(records[1].camera, "");
        let groups: Vec<usize> = records.iter().map(|r| r.group).collect();
        assert_eq!(groups, vec![0, 0, 1]);

        assert!(config.thumbnail_directory.join("porto.jpg").exists());
        assert!(!config.thumbnail_directory.join("no_gps.jpg").exists());
    }

    struct FailingThumbnailer;

    impl Thumbnailer for FailingThumbnailer {
        fn generate(&self, _: &Path, _: &Path, _: Option<u32>) -> Result<(), AppError> {
            Err(AppError::Generic("codec unavailable".into()))
        }
    }

    #[test]
    fn thumbnail_failure_excludes_photo() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        std::fs::write(
            originals(tmp.path()).join("lisbon.jpg"),
            jpeg_with_exif(&lisbon_gps_fields()),
        )
        .unwrap();

        let summary = run(&config, &FailingThumbnailer).unwrap();

        assert_eq!(summary.failed, 1);
        assert!(load_catalog(&config.output_path).unwrap().is_empty());
    }

    #[test]
    fn catalog_write_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config(tmp.path());
        std::fs::write(tmp.path().join("blocker"), b"x").unwrap();
        config.output_path = tmp.path().join("blocker").join("photo-data.json");

        let result = run(&config, &FailingThumbnailer);

        assert!(matches!(result, Err(AppError::CatalogWrite { .. })));
    }
}
