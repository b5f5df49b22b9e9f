use crate::error::{Error, Result};
use std::path::PathBuf;

pub const DEFAULT_FEED_PATH: &str = "soundon.xml";
pub const DEFAULT_STORE_PATH: &str = "apple.json";
pub const DEFAULT_TEMPLATE_PATH: &str = "index_template.html";
pub const DEFAULT_OUTPUT_PATH: &str = "index.html";

#[derive(Debug, Clone)]
pub struct Settings {
    pub feed_path: PathBuf,
    pub store_path: PathBuf,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
}

impl Settings {
    /// Validate configuration before the pipeline starts, so a missing
    /// input fails the run before anything is written.
    pub fn validate(&self) -> Result<()> {
        for (label, path) in [
            ("feed", &self.feed_path),
            ("store metadata", &self.store_path),
            ("template", &self.template_path),
        ] {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "{} file not found: {}",
                    label,
                    path.display()
                )));
            }
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(Error::Config("Output path must not be empty".to_string()));
        }

        Ok(())
    }
}
