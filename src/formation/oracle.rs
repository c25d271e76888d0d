use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::predict::{next_pass, Aos, GroundStation, OrbitalElementSet, PassWindow};

/// Next pass per station name; `None` when no transit was found.
pub type StationPasses = BTreeMap<String, Option<PassWindow>>;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Oracle returned status {0}")]
    Status(u16),
    #[error("Oracle task failed: {0}")]
    Task(String),
}

/// Source of AOS/LOS windows for one satellite over many stations.
pub trait PassOracle: Send + Sync + 'static {
    fn next_passes(
        &self,
        elements: &OrbitalElementSet,
        stations: &[GroundStation],
        after: DateTime<Utc>,
    ) -> impl Future<Output = Result<StationPasses, OracleError>> + Send;
}

/// Searches the elevation curve in-process.
#[derive(Debug, Clone)]
pub struct LocalOracle {
    horizon: Duration,
}

impl LocalOracle {
    pub fn new(horizon: Duration) -> Self {
        Self { horizon }
    }

    /// Blocking evaluation. A failing station is logged and left without data.
    pub fn evaluate(
        &self,
        elements: &OrbitalElementSet,
        stations: &[GroundStation],
        after: DateTime<Utc>,
    ) -> StationPasses {
        stations
            .iter()
            .map(|station| {
                let window = match next_pass(elements, station, after, self.horizon) {
                    Ok(window) => window,
                    Err(e) => {
                        log::warn!(
                            "Pass search failed for {} over {}: {}",
                            elements.name(),
                            station.name,
                            e
                        );
                        None
                    }
                };
                (station.name.clone(), window)
            })
            .collect()
    }
}

impl PassOracle for LocalOracle {
    async fn next_passes(
        &self,
        elements: &OrbitalElementSet,
        stations: &[GroundStation],
        after: DateTime<Utc>,
    ) -> Result<StationPasses, OracleError> {
        let oracle = self.clone();
        let elements = elements.clone();
        let stations = stations.to_vec();
        tokio::task::spawn_blocking(move || oracle.evaluate(&elements, &stations, after))
            .await
            .map_err(|e| OracleError::Task(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OracleStation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub hgt_m: f64,
}

impl From<&GroundStation> for OracleStation {
    fn from(gs: &GroundStation) -> Self {
        Self {
            name: gs.name.clone(),
            lat: gs.latitude_deg,
            lng: gs.longitude_deg,
            hgt_m: gs.altitude_m(),
        }
    }
}

impl From<&OracleStation> for GroundStation {
    fn from(s: &OracleStation) -> Self {
        GroundStation::new(&s.name, s.lat, s.lng, s.hgt_m / 1000.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OracleRequest {
    pub tle1: String,
    pub tle2: String,
    pub stations: Vec<OracleStation>,
}

/// Wire form of one station's window. An in-progress pass reports the
/// evaluation instant as `aos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OracleTimes {
    #[serde(default)]
    pub aos: Option<DateTime<Utc>>,
    #[serde(default)]
    pub los: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress: Option<bool>,
}

impl OracleTimes {
    pub fn from_window(window: Option<&PassWindow>, evaluated_at: DateTime<Utc>) -> Self {
        match window {
            None => Self::default(),
            Some(w) => Self {
                aos: Some(w.aos.time().unwrap_or(evaluated_at)),
                los: w.los,
                in_progress: Some(w.aos.is_in_progress()),
            },
        }
    }

    /// Without an explicit flag, an AOS at or before `received_at` means the
    /// pass had already started when the oracle answered.
    pub fn into_window(self, received_at: DateTime<Utc>) -> Option<PassWindow> {
        let aos_time = self.aos?;
        let in_progress = self.in_progress.unwrap_or(aos_time <= received_at);
        Some(PassWindow {
            aos: if in_progress {
                Aos::InProgress
            } else {
                Aos::Upcoming(aos_time)
            },
            los: self.los,
            max_elevation_deg: None,
        })
    }
}

/// Remote pass-prediction service speaking the `/next_pass_all` protocol.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
}

impl HttpOracle {
    pub fn new(url: &str, timeout: StdDuration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl PassOracle for HttpOracle {
    async fn next_passes(
        &self,
        elements: &OrbitalElementSet,
        stations: &[GroundStation],
        _after: DateTime<Utc>,
    ) -> Result<StationPasses, OracleError> {
        let request = OracleRequest {
            tle1: elements.line1().to_string(),
            tle2: elements.line2().to_string(),
            stations: stations.iter().map(OracleStation::from).collect(),
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(OracleError::Status(response.status().as_u16()));
        }
        let body: BTreeMap<String, OracleTimes> = response.json().await?;
        let received_at = Utc::now();

        Ok(stations
            .iter()
            .map(|gs| {
                let window = body
                    .get(&gs.name)
                    .cloned()
                    .and_then(|t| t.into_window(received_at));
                (gs.name.clone(), window)
            })
            .collect())
    }
}

/// Either oracle, chosen from configuration.
#[derive(Debug, Clone)]
pub enum AnyOracle {
    Local(LocalOracle),
    Http(HttpOracle),
}

impl PassOracle for AnyOracle {
    async fn next_passes(
        &self,
        elements: &OrbitalElementSet,
        stations: &[GroundStation],
        after: DateTime<Utc>,
    ) -> Result<StationPasses, OracleError> {
        match self {
            AnyOracle::Local(o) => o.next_passes(elements, stations, after).await,
            AnyOracle::Http(o) => o.next_passes(elements, stations, after).await,
        }
    }
}
