use crate::error::AppError;
use crate::metadata::{PhotoRecord, UngroupedPhoto};
use std::io::Write;
use std::path::Path;

/// Newest first by date string. Undated photos sort last; ties keep their
/// discovery order.
pub fn sort_by_date_desc(photos: &mut [UngroupedPhoto]) {
    photos.sort_by(|a, b| b.capture_date.cmp(&a.capture_date));
}

/// Publishes the catalog as pretty-printed JSON.
///
/// The whole document is written to a sibling temp file first and then
/// renamed over `path`, so readers never see a partial catalog.
pub fn write_catalog(path: &Path, records: &[PhotoRecord]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(records)?;
    let wrap = |source: std::io::Error| AppError::CatalogWrite {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::Generic(format!("catalog path has no file name: {:?}", path)))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)
    })();
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(wrap(e));
    }

    log::debug!("Catalog written to {:?}", path);
    Ok(())
}

/// Reads a published catalog. A missing file means no photos yet.
#[allow(dead_code)] // reader side, used by the site build
pub fn load_catalog(path: &Path) -> Result<Vec<PhotoRecord>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
