use crate::config::AppConfig;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the image files directly inside `dir`, sorted by file name.
///
/// A missing or unreadable directory is not an error: it yields no
/// candidates. Unreadable entries inside it are skipped.
pub fn find_images(config: &AppConfig, dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        log::info!("No originals directory at {:?}", dir);
        return Vec::new();
    }

    log::info!("Starting file discovery in {:?}", dir);
    log::debug!("Configured allowed extensions: {:?}", config.allowed_extensions);

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                log::warn!("Cannot read originals directory {:?}: {}", dir, e);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() {
            log::trace!("Skipping non-file entry: {:?}", path);
            continue;
        }
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if config.is_allowed_extension(ext) => {
                log::debug!("Discovered image: {:?}", path);
                images.push(path.to_path_buf());
            }
            Some(ext) => log::trace!("Skipping unsupported extension {} for {:?}", ext, path),
            None => log::trace!("Skipping file with no extension: {:?}", path),
        }
    }

    log::info!("File discovery complete: {} candidate image(s).", images.len());
    images
}
