use crate::error::AppError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub originals_directory: PathBuf,
    pub thumbnail_directory: PathBuf,
    pub output_path: PathBuf,
    pub source_url_prefix: String,
    pub thumbnail_url_prefix: String,
    pub thumbnail_width: u32,
    pub thumbnail_quality: u8,
    pub allowed_extensions: Vec<String>,
    pub log_level: String,
}

impl AppConfig {
    /// Defaults, then `default`, `$RUN_MODE` and `local` files from `config_dir`,
    /// then `PHOTOS_*` environment variables.
    pub fn load(config_dir: &Path) -> Result<Self, AppError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("originals_directory", "public/photos/originals")?
            .set_default("thumbnail_directory", "public/photos/thumbs")?
            .set_default("output_path", "public/photo-data.json")?
            .set_default("source_url_prefix", "/photos/originals")?
            .set_default("thumbnail_url_prefix", "/photos/thumbs")?
            .set_default("thumbnail_width", 400_i64)?
            .set_default("thumbnail_quality", 80_i64)?
            .set_default(
                "allowed_extensions",
                vec!["jpg", "jpeg", "png", "webp", "tif", "tiff"],
            )?
            .set_default("log_level", "info")?
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(&env)).required(false))
            .add_source(File::from(config_dir.join("local")).required(false))
            .add_source(Environment::with_prefix("PHOTOS"))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}
