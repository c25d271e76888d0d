use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::feed::document::{FeedDocument, FeedEntry, FeedSource, FetchLogEntry, FetchStatus};
use crate::config::MissionConfig;
use crate::feed::error::FeedError;
use crate::predict::OrbitalElementSet;

pub const CELESTRAK_GP_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

/// One satellite the fetcher keeps current.
#[derive(Debug, Clone)]
pub struct FetchTarget {
    pub name: String,
    pub catalog_id: Option<String>,
    pub manual_tle: Option<String>,
}

impl FetchTarget {
    fn key(&self) -> &str {
        self.catalog_id.as_deref().unwrap_or(&self.name)
    }
}

/// Every configured satellite once, keyed by catalog id (or name).
pub fn fetch_targets(missions: &[MissionConfig]) -> Vec<FetchTarget> {
    let mut targets: Vec<FetchTarget> = Vec::new();
    for mission in missions {
        for sat in mission.satellite.iter().chain(mission.satellites.iter()) {
            let target = FetchTarget {
                name: sat.name.clone().unwrap_or_else(|| mission.name.clone()),
                catalog_id: sat.catalog_id.clone(),
                manual_tle: sat.tle.clone(),
            };
            if !targets.iter().any(|t| t.key() == target.key()) {
                targets.push(target);
            }
        }
    }
    targets
}

pub struct FeedFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl FeedFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Current element lines for one catalog number.
    pub async fn fetch_tle(&self, catalog_id: &str) -> Result<String, FeedError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("CATNR", catalog_id), ("FORMAT", "TLE")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        let (line1, line2) =
            extract_tle_pair(&text).ok_or_else(|| FeedError::InvalidTle(catalog_id.to_string()))?;
        OrbitalElementSet::from_lines(catalog_id, line1, line2)
            .map_err(|e| FeedError::InvalidTle(e.to_string()))?;
        Ok(format!("{}\n{}", line1, line2))
    }

    /// Build a fresh document: fetched elements first, then the embedded
    /// set, then whatever the previous document held.
    pub async fn build_document(
        &self,
        targets: &[FetchTarget],
        previous: Option<&FeedDocument>,
        now: DateTime<Utc>,
    ) -> FeedDocument {
        let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut out = FeedDocument {
            last_updated: Some(stamp.clone()),
            ..FeedDocument::default()
        };

        for target in targets {
            let mut found: Option<(String, FeedSource)> = None;

            if let Some(id) = &target.catalog_id {
                match self.fetch_tle(id).await {
                    Ok(tle) => {
                        log::info!("[{}] fetched elements for {}", id, target.name);
                        found = Some((tle, FeedSource::Celestrak));
                    }
                    Err(e) => log::warn!("[{}] fetch failed: {}", id, e),
                }
            }

            if found.is_none() {
                if let Some(tle) = &target.manual_tle {
                    match OrbitalElementSet::from_tle(&target.name, tle) {
                        Ok(_) => {
                            log::info!("[{}] using embedded elements", target.name);
                            found = Some((tle.clone(), FeedSource::Manual));
                        }
                        Err(e) => log::warn!("[{}] embedded elements rejected: {}", target.name, e),
                    }
                }
            }

            let status = match found {
                Some((tle, source)) => {
                    let epoch = OrbitalElementSet::from_tle(&target.name, &tle)
                        .ok()
                        .map(|set| set.epoch().to_rfc3339_opts(SecondsFormat::Secs, true));
                    out.satellites.insert(
                        target.key().to_string(),
                        FeedEntry {
                            name: target.name.clone(),
                            norad_id: target.catalog_id.clone(),
                            tle,
                            epoch,
                            fetched_at: Some(stamp.clone()),
                            source,
                            note: None,
                        },
                    );
                    FetchStatus::Success
                }
                None => match previous.and_then(|p| p.satellites.get(target.key())) {
                    Some(prev) => {
                        log::warn!("[{}] keeping previous elements", target.name);
                        let mut entry = prev.clone();
                        entry.note = Some("Using previous TLE (fetch/manual failed today)".into());
                        out.satellites.insert(target.key().to_string(), entry);
                        FetchStatus::Fallback
                    }
                    None => {
                        log::error!("[{}] no elements available", target.name);
                        FetchStatus::Failed
                    }
                },
            };

            out.fetch_log.push(FetchLogEntry {
                norad_id: target
                    .catalog_id
                    .clone()
                    .unwrap_or_else(|| "manual".to_string()),
                name: target.name.clone(),
                status,
                timestamp: stamp.clone(),
            });
        }

        let ok = out
            .fetch_log
            .iter()
            .filter(|r| r.status != FetchStatus::Failed)
            .count();
        log::info!("Resolved {}/{} element sets", ok, targets.len());
        out
    }
}

/// First line-1/line-2 pair of full length in a response body.
pub fn extract_tle_pair(text: &str) -> Option<(&str, &str)> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    let line1 = lines.iter().find(|l| l.starts_with("1 "))?;
    let line2 = lines.iter().find(|l| l.starts_with("2 "))?;
    if line1.len() >= 69 && line2.len() >= 69 {
        Some((*line1, *line2))
    } else {
        None
    }
}
