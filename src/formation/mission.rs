use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::config::{MissionConfig, SatelliteConfig};
use crate::feed::ElementFeed;
use crate::predict::{GroundStation, OrbitalElementSet};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    Primary,
    Secondary,
    Tertiary,
}

/// What is known about a satellite's orbit.
#[derive(Debug, Clone)]
pub enum ElementStatus {
    Loaded(OrbitalElementSet),
    /// No element set yet, e.g. before launch.
    Missing,
    /// The element set did not parse; tracking stays off until it is fixed.
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct Satellite {
    pub name: String,
    pub role: Option<Role>,
    pub catalog_id: Option<String>,
    pub planned_launch: Option<String>,
    pub elements: ElementStatus,
}

impl Satellite {
    pub fn new(name: &str, role: Option<Role>, elements: Option<OrbitalElementSet>) -> Self {
        Self {
            name: name.to_string(),
            role,
            catalog_id: None,
            planned_launch: None,
            elements: match elements {
                Some(set) => ElementStatus::Loaded(set),
                None => ElementStatus::Missing,
            },
        }
    }

    fn from_config(default_name: &str, config: &SatelliteConfig, feed: &ElementFeed) -> Self {
        let name = config.name.clone().unwrap_or_else(|| default_name.to_string());
        let elements = match feed.resolve(&name, config.catalog_id.as_deref(), config.tle.as_deref())
        {
            Ok(Some(set)) => ElementStatus::Loaded(set),
            Ok(None) => ElementStatus::Missing,
            Err(e) => {
                log::warn!("{}", e);
                ElementStatus::Invalid(e.to_string())
            }
        };

        Self {
            name,
            role: config.role,
            catalog_id: config.catalog_id.clone(),
            planned_launch: config.planned_launch.clone(),
            elements,
        }
    }

    pub fn elements(&self) -> Option<&OrbitalElementSet> {
        match &self.elements {
            ElementStatus::Loaded(set) => Some(set),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum MissionKind {
    Single(Satellite),
    Formation {
        satellites: Vec<Satellite>,
        selected: Role,
    },
}

/// A tracked mission: one satellite or a formation sharing one station list.
#[derive(Debug, Clone)]
pub struct Mission {
    pub name: String,
    pub stations: Vec<GroundStation>,
    pub kind: MissionKind,
}

impl Mission {
    pub fn single(name: &str, stations: Vec<GroundStation>, satellite: Satellite) -> Self {
        Self {
            name: name.to_string(),
            stations,
            kind: MissionKind::Single(satellite),
        }
    }

    pub fn formation(
        name: &str,
        stations: Vec<GroundStation>,
        satellites: Vec<Satellite>,
        selected: Role,
    ) -> Self {
        Self {
            name: name.to_string(),
            stations,
            kind: MissionKind::Formation {
                satellites,
                selected,
            },
        }
    }

    pub fn from_config(config: &MissionConfig, feed: &ElementFeed) -> Self {
        let stations = config.stations.clone();
        if config.is_formation() {
            let satellites = config
                .satellites
                .iter()
                .map(|s| Satellite::from_config(&config.name, s, feed))
                .collect();
            Self::formation(
                &config.name,
                stations,
                satellites,
                config.selected_role.unwrap_or_default(),
            )
        } else {
            let sat_config = config.satellite.clone().unwrap_or_default();
            let satellite = Satellite::from_config(&config.name, &sat_config, feed);
            Self::single(&config.name, stations, satellite)
        }
    }

    pub fn is_formation(&self) -> bool {
        matches!(self.kind, MissionKind::Formation { .. })
    }

    /// Every satellite in listing order.
    pub fn members(&self) -> &[Satellite] {
        match &self.kind {
            MissionKind::Single(sat) => std::slice::from_ref(sat),
            MissionKind::Formation { satellites, .. } => satellites,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Satellite> {
        self.members().iter().find(|s| s.name == name)
    }

    /// The satellite a single-satellite view shows, given a role override.
    pub fn selected(&self, role: Option<Role>) -> Option<&Satellite> {
        match &self.kind {
            MissionKind::Single(sat) => Some(sat),
            MissionKind::Formation {
                satellites,
                selected,
            } => {
                let role = role.unwrap_or(*selected);
                satellites.iter().find(|s| s.role == Some(role))
            }
        }
    }

    pub fn has_elements(&self) -> bool {
        self.members().iter().any(|s| s.elements().is_some())
    }
}

/// All missions known to the engine, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct MissionCatalog {
    missions: Vec<Mission>,
}

impl MissionCatalog {
    pub fn new(missions: Vec<Mission>) -> Self {
        Self { missions }
    }

    pub fn from_config(configs: &[MissionConfig], feed: &ElementFeed) -> Self {
        Self::new(configs.iter().map(|c| Mission::from_config(c, feed)).collect())
    }

    pub fn get(&self, name: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.name == name)
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn first(&self) -> Option<&Mission> {
        self.missions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::predict::fixtures::{duthsat2, leader, DUTHSAT2_L1, DUTHSAT2_L2};
    use std::str::FromStr;

    #[test]
    fn role_parses_and_prints_snake_case() {
        assert_eq!(Role::from_str("secondary").unwrap(), Role::Secondary);
        assert_eq!(Role::Primary.to_string(), "primary");
        assert!(Role::from_str("captain").is_err());
    }

    #[test]
    fn single_mission_has_one_member() {
        let sat = Satellite::new("DUTHSat-2", None, Some(duthsat2()));
        let mission = Mission::single("DUTHSat-2", vec![], sat);
        assert_eq!(mission.members().len(), 1);
        assert_eq!(mission.selected(None).unwrap().name, "DUTHSat-2");
        assert!(!mission.is_formation());
    }

    #[test]
    fn formation_selects_by_role() {
        let mission = Mission::formation(
            "PHASMA",
            vec![],
            vec![
                Satellite::new("LAMARR", Some(Role::Primary), Some(duthsat2())),
                Satellite::new("DIRAC", Some(Role::Secondary), Some(leader())),
            ],
            Role::Primary,
        );
        assert_eq!(mission.selected(None).unwrap().name, "LAMARR");
        assert_eq!(mission.selected(Some(Role::Secondary)).unwrap().name, "DIRAC");
        assert!(mission.selected(Some(Role::Tertiary)).is_none());
        assert_eq!(
            mission.members().iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["LAMARR", "DIRAC"]
        );
    }

    #[test]
    fn catalog_from_config_marks_element_status() {
        let yaml = format!(
            r#"
missions:
  - name: DUTHSat-2
    satellite:
      tle: |
        {}
        {}
  - name: LAMARR-ONLY
    satellite:
      tle: "1 00000U 00000A   25332.80257208\n2 00000  97.4389"
  - name: PeakSat
    satellite:
      planned_launch: February 2026
"#,
            DUTHSAT2_L1, DUTHSAT2_L2
        );
        let config = Config::from_yaml(&yaml).unwrap();
        let catalog = MissionCatalog::from_config(&config.missions, &ElementFeed::empty());

        let duth = catalog.get("DUTHSat-2").unwrap();
        assert!(duth.has_elements());
        assert_eq!(duth.members()[0].name, "DUTHSat-2");

        let broken = catalog.get("LAMARR-ONLY").unwrap();
        assert!(matches!(broken.members()[0].elements, ElementStatus::Invalid(_)));

        let peak = catalog.get("PeakSat").unwrap();
        assert!(matches!(peak.members()[0].elements, ElementStatus::Missing));
        assert_eq!(
            peak.members()[0].planned_launch.as_deref(),
            Some("February 2026")
        );
        assert!(!peak.has_elements());
    }
}
