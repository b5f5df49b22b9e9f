use crate::error::Result;
use crate::format::normalize_guid;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Normalized episode identifier → store deep link.
pub type LinkIndex = HashMap<String, String>;

/// The store lookup payload: a `results` array of episode records, of
/// which only the identifier and deep-link fields matter here.
#[derive(Debug, Deserialize)]
pub struct StoreCatalog {
    #[serde(default)]
    pub results: Vec<StoreEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StoreEntry {
    #[serde(rename = "episodeGuid", default)]
    pub episode_guid: Option<String>,
    #[serde(rename = "trackViewUrl", default)]
    pub track_view_url: Option<String>,
}

impl StoreCatalog {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    /// Index deep links by normalized episode identifier. Entries missing
    /// either field are skipped; a duplicate identifier keeps the later
    /// entry.
    pub fn link_index(&self) -> LinkIndex {
        self.results
            .iter()
            .filter_map(|entry| {
                let guid = entry.episode_guid.as_deref().filter(|g| !g.is_empty())?;
                let url = entry.track_view_url.as_deref().filter(|u| !u.is_empty())?;
                Some((normalize_guid(guid), url.to_string()))
            })
            .collect()
    }
}
