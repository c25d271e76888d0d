use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::feed::error::FeedError;
use crate::predict::{OrbitalElementSet, PredictError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Celestrak,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub name: String,
    #[serde(default)]
    pub norad_id: Option<String>,
    /// Line 1 and line 2 separated by a newline.
    pub tle: String,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub fetched_at: Option<String>,
    pub source: FeedSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Success,
    Fallback,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchLogEntry {
    pub norad_id: String,
    pub name: String,
    pub status: FetchStatus,
    pub timestamp: String,
}

/// The element-set document produced by the fetcher. Timestamps are kept as
/// the ISO-8601 text found in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub satellites: BTreeMap<String, FeedEntry>,
    #[serde(default)]
    pub fetch_log: Vec<FetchLogEntry>,
}

impl FeedDocument {
    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, FeedError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write through a sibling temp file so readers never see a partial document.
    pub fn save(&self, path: &Path) -> Result<(), FeedError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        std::fs::rename(tmp, path)?;
        Ok(())
    }
}

/// Element-set lookup keyed by catalog identifier.
#[derive(Debug, Clone, Default)]
pub struct ElementFeed {
    document: FeedDocument,
}

impl ElementFeed {
    pub fn new(document: FeedDocument) -> Self {
        Self { document }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &FeedDocument {
        &self.document
    }

    pub fn lookup(&self, catalog_id: &str) -> Option<&FeedEntry> {
        self.document.satellites.get(catalog_id)
    }

    /// Elements for a satellite: the feed entry keyed by its catalog id (or
    /// its name when it has none) when one parses, else the embedded element
    /// text, else nothing. Only a broken embedded set is an error.
    pub fn resolve(
        &self,
        name: &str,
        catalog_id: Option<&str>,
        embedded: Option<&str>,
    ) -> Result<Option<OrbitalElementSet>, PredictError> {
        let key = catalog_id.unwrap_or(name);
        if let Some(entry) = self.lookup(key) {
            match OrbitalElementSet::from_tle(name, &entry.tle) {
                Ok(set) => return Ok(Some(set)),
                Err(e) => log::warn!("Ignoring feed entry for {}: {}", name, e),
            }
        }

        match embedded {
            Some(tle) => OrbitalElementSet::from_tle(name, tle).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::fixtures::{DUTHSAT2_L1, DUTHSAT2_L2, LEADER_L1, LEADER_L2};

    fn document() -> FeedDocument {
        let json = format!(
            r#"{{
              "last_updated": "2025-11-28T19:00:00.123456",
              "satellites": {{
                "64533": {{
                  "name": "LEADER",
                  "norad_id": "64533",
                  "tle": "{}\n{}",
                  "epoch": "2025-09-24T07:35:41",
                  "fetched_at": "2025-11-28T19:00:00",
                  "source": "celestrak"
                }},
                "DUTHSat-2": {{
                  "name": "DUTHSat-2",
                  "norad_id": null,
                  "tle": "{}\n{}",
                  "source": "manual"
                }},
                "BROKEN": {{
                  "name": "BROKEN",
                  "norad_id": null,
                  "tle": "1 00000U\n2 00000",
                  "source": "manual"
                }}
              }},
              "fetch_log": [
                {{"norad_id": "64533", "name": "LEADER", "status": "success", "timestamp": "2025-11-28T19:00:00"}}
              ]
            }}"#,
            LEADER_L1, LEADER_L2, DUTHSAT2_L1, DUTHSAT2_L2
        );
        FeedDocument::from_json(&json).unwrap()
    }

    #[test]
    fn lookup_by_catalog_id() {
        let feed = ElementFeed::new(document());
        assert_eq!(feed.lookup("64533").unwrap().name, "LEADER");
        assert!(feed.lookup("99999").is_none());
        assert_eq!(feed.document().fetch_log[0].status, FetchStatus::Success);
    }

    #[test]
    fn feed_entry_wins_over_embedded() {
        let feed = ElementFeed::new(document());
        let embedded = format!("{}\n{}", DUTHSAT2_L1, DUTHSAT2_L2);
        let set = feed
            .resolve("sat", Some("64533"), Some(&embedded))
            .unwrap()
            .unwrap();
        assert_eq!(set.line1(), LEADER_L1);
    }

    #[test]
    fn missing_entry_falls_back_to_embedded() {
        let feed = ElementFeed::new(document());
        let embedded = format!("{}\n{}", DUTHSAT2_L1, DUTHSAT2_L2);
        let set = feed
            .resolve("DUTHSat-2", Some("64532"), Some(&embedded))
            .unwrap()
            .unwrap();
        assert_eq!(set.line1(), DUTHSAT2_L1);

        let set = feed.resolve("DUTHSat-2", None, Some(&embedded)).unwrap();
        assert!(set.is_some());
    }

    #[test]
    fn entry_without_catalog_id_is_keyed_by_name() {
        let feed = ElementFeed::new(document());
        let set = feed.resolve("DUTHSat-2", None, None).unwrap().unwrap();
        assert_eq!(set.line1(), DUTHSAT2_L1);
        assert!(feed.resolve("Unlisted", None, None).unwrap().is_none());
    }

    #[test]
    fn broken_feed_entry_falls_back() {
        let feed = ElementFeed::new(document());
        let embedded = format!("{}\n{}", DUTHSAT2_L1, DUTHSAT2_L2);
        let set = feed.resolve("BROKEN", Some("BROKEN"), Some(&embedded)).unwrap();
        assert_eq!(set.unwrap().line2(), DUTHSAT2_L2);
    }

    #[test]
    fn nothing_known_is_not_an_error() {
        let feed = ElementFeed::empty();
        assert!(feed.resolve("PeakSat", None, None).unwrap().is_none());
    }

    #[test]
    fn broken_embedded_set_is_an_error() {
        let feed = ElementFeed::empty();
        let err = feed.resolve("LAMARR", None, Some("1 00000U\n2 00000")).unwrap_err();
        assert!(matches!(err, PredictError::InvalidElements { .. }));
    }

    #[test]
    fn save_then_load_keeps_entries() {
        let dir = std::env::temp_dir().join(format!("sat-o-vis-feed-{}", std::process::id()));
        let path = dir.join("tle_data.json");
        let doc = document();
        doc.save(&path).unwrap();
        assert_eq!(FeedDocument::load(&path).unwrap(), doc);
        std::fs::remove_dir_all(dir).unwrap();
    }
}
