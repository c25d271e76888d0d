use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::formation::Role;
use crate::predict::GroundStation;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub missions: Vec<MissionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_feed_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            timeout: default_feed_timeout(),
        }
    }
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_refresh", deserialize_with = "deserialize_duration")]
    pub refresh_interval: Duration,
    #[serde(default = "default_track_step", deserialize_with = "deserialize_duration")]
    pub track_step: Duration,
    #[serde(default)]
    pub track_window_samples: Option<usize>,
    #[serde(default = "default_track_lifetime", deserialize_with = "deserialize_duration")]
    pub track_lifetime: Duration,
    #[serde(default = "default_pass_horizon", deserialize_with = "deserialize_duration")]
    pub pass_horizon: Duration,
    #[serde(default)]
    pub initial_mission: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh(),
            track_step: default_track_step(),
            track_window_samples: None,
            track_lifetime: default_track_lifetime(),
            pass_horizon: default_pass_horizon(),
            initial_mission: None,
        }
    }
}

fn default_refresh() -> Duration {
    Duration::from_secs(1)
}

fn default_track_step() -> Duration {
    Duration::from_secs(10)
}

fn default_track_lifetime() -> Duration {
    Duration::from_secs(600)
}

fn default_pass_horizon() -> Duration {
    Duration::from_secs(24 * 3600)
}

#[derive(Debug, Clone, Deserialize)]
pub struct MissionConfig {
    pub name: String,
    #[serde(default)]
    pub stations: Vec<GroundStation>,
    #[serde(default)]
    pub satellite: Option<SatelliteConfig>,
    #[serde(default)]
    pub satellites: Vec<SatelliteConfig>,
    #[serde(default)]
    pub selected_role: Option<Role>,
}

impl MissionConfig {
    pub fn is_formation(&self) -> bool {
        !self.satellites.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SatelliteConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub catalog_id: Option<String>,
    /// Embedded element set used when the feed has no entry.
    #[serde(default)]
    pub tle: Option<String>,
    #[serde(default)]
    pub planned_launch: Option<String>,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn find_mission(&self, name: &str) -> Option<&MissionConfig> {
        self.missions.iter().find(|m| m.name == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.tracker.refresh_interval.is_zero() || self.tracker.track_step.is_zero() {
            return invalid("refresh_interval and track_step must be positive".into());
        }

        let mut names = HashSet::new();
        for mission in &self.missions {
            if !names.insert(mission.name.as_str()) {
                return invalid(format!("duplicate mission {}", mission.name));
            }

            let mut stations = HashSet::new();
            for station in &mission.stations {
                if !stations.insert(station.name.as_str()) {
                    return invalid(format!(
                        "mission {}: duplicate station {}",
                        mission.name, station.name
                    ));
                }
                station.validate().map_err(ConfigError::Invalid)?;
            }

            if !mission.is_formation() {
                continue;
            }
            if mission.satellite.is_some() {
                return invalid(format!(
                    "mission {}: use either satellite or satellites",
                    mission.name
                ));
            }

            let mut members = HashSet::new();
            for sat in &mission.satellites {
                let Some(name) = sat.name.as_deref() else {
                    return invalid(format!("mission {}: formation member without name", mission.name));
                };
                if !members.insert(name) {
                    return invalid(format!("mission {}: duplicate member {}", mission.name, name));
                }
                if sat.role.is_none() {
                    return invalid(format!("mission {}: member {} has no role", mission.name, name));
                }
            }

            let selected = mission.selected_role.unwrap_or_default();
            let holders = mission
                .satellites
                .iter()
                .filter(|s| s.role == Some(selected))
                .count();
            if holders != 1 {
                return invalid(format!(
                    "mission {}: {} members hold the selected role {}",
                    mission.name, holders, selected
                ));
            }
        }

        if let Some(initial) = &self.tracker.initial_mission {
            if self.find_mission(initial).is_none() {
                return invalid(format!("initial mission {} is not defined", initial));
            }
        }

        Ok(())
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
web:
  bind: 127.0.0.1:9000
tracker:
  refresh_interval: 500ms
  pass_horizon: 12h
  initial_mission: PHASMA
missions:
  - name: DUTHSat-2
    stations:
      - { name: Greece (DUTH), lat: 41.1419, lng: 24.8900, hgt_km: 0.076 }
    satellite:
      catalog_id: "64532"
  - name: PHASMA
    selected_role: primary
    stations:
      - { name: Athens, lat: 37.98381, lng: 23.72754 }
      - { name: Crete, lat: 35.3387, lng: 25.1442, hgt_km: 0.076 }
    satellites:
      - { name: LAMARR, role: primary }
      - { name: DIRAC, role: secondary }
  - name: PeakSat
    satellite:
      planned_launch: February 2026
"#;

    #[test]
    fn parses_missions_and_durations() {
        let config = Config::from_yaml(CONFIG).unwrap();
        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(config.tracker.refresh_interval, Duration::from_millis(500));
        assert_eq!(config.tracker.pass_horizon, Duration::from_secs(12 * 3600));
        assert_eq!(config.tracker.track_step, Duration::from_secs(10));
        assert_eq!(config.feed.timeout, Duration::from_secs(30));
        assert_eq!(config.missions.len(), 3);

        let phasma = config.find_mission("PHASMA").unwrap();
        assert!(phasma.is_formation());
        assert_eq!(phasma.stations[0].altitude_km, 0.0);
        assert_eq!(phasma.satellites[1].role, Some(Role::Secondary));
    }

    #[test]
    fn rejects_duplicate_station_names() {
        let yaml = r#"
missions:
  - name: X
    stations:
      - { name: A, lat: 1, lng: 2 }
      - { name: A, lat: 3, lng: 4 }
"#;
        assert!(matches!(Config::from_yaml(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_formation_without_selected_member() {
        let yaml = r#"
missions:
  - name: X
    selected_role: primary
    satellites:
      - { name: A, role: secondary }
      - { name: B, role: secondary }
"#;
        assert!(matches!(Config::from_yaml(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unknown_initial_mission() {
        let yaml = "tracker:\n  initial_mission: nope\nmissions: []\n";
        assert!(matches!(Config::from_yaml(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_duration() {
        let yaml = "tracker:\n  refresh_interval: soon\nmissions: []\n";
        assert!(matches!(Config::from_yaml(yaml), Err(ConfigError::Yaml(_))));
    }
}
