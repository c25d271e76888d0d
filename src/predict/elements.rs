use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements, MinutesSinceEpoch};

use crate::predict::error::PredictError;

/// A parsed two-line element set. Immutable once loaded; a newer set
/// replaces it wholesale.
#[derive(Clone)]
pub struct OrbitalElementSet {
    name: String,
    line1: String,
    line2: String,
    elements: Arc<Elements>,
    constants: Arc<Constants>,
}

impl OrbitalElementSet {
    pub fn from_lines(name: &str, line1: &str, line2: &str) -> Result<Self, PredictError> {
        let line1 = line1.trim();
        let line2 = line2.trim();
        let invalid = |message: String| PredictError::InvalidElements {
            name: name.to_string(),
            message,
        };

        let elements = Elements::from_tle(
            Some(name.to_string()),
            line1.as_bytes(),
            line2.as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;
        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements: Arc::new(elements),
            constants: Arc::new(constants),
        })
    }

    /// Parse 2-line or 3-line element text. A title line, when present,
    /// wins over `fallback_name`.
    pub fn from_tle(fallback_name: &str, tle: &str) -> Result<Self, PredictError> {
        let (title, line1, line2) = parse_tle_lines(tle).ok_or_else(|| {
            PredictError::InvalidElements {
                name: fallback_name.to_string(),
                message: "expected two element lines with an optional title line".into(),
            }
        })?;
        let name = title.unwrap_or_else(|| fallback_name.to_string());
        Self::from_lines(&name, &line1, &line2)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    pub fn catalog_number(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn age(&self, at: DateTime<Utc>) -> Duration {
        at - self.epoch()
    }

    /// Revolutions per day.
    pub fn mean_motion(&self) -> f64 {
        self.elements.mean_motion
    }

    pub fn orbital_period(&self) -> Duration {
        let minutes = 1440.0 / self.elements.mean_motion;
        Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }

    pub(crate) fn minutes_since_epoch(
        &self,
        at: DateTime<Utc>,
    ) -> Result<MinutesSinceEpoch, PredictError> {
        self.elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))
    }

    pub(crate) fn constants(&self) -> &Constants {
        &self.constants
    }
}

impl PartialEq for OrbitalElementSet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.line1 == other.line1 && self.line2 == other.line2
    }
}

impl fmt::Debug for OrbitalElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitalElementSet")
            .field("name", &self.name)
            .field("line1", &self.line1)
            .field("line2", &self.line2)
            .finish()
    }
}

pub fn parse_tle_lines(tle: &str) -> Option<(Option<String>, String, String)> {
    let lines: Vec<String> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Some((None, lines[0].clone(), lines[1].clone())),
        3 => Some((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const DUTHSAT2_L1: &str =
        "1 64532U 25135E   25267.31645216  .00019005  00000-0  92304-3 0  9992";
    pub const DUTHSAT2_L2: &str =
        "2 64532  97.4549  20.3503 0005468  29.9791 330.1755 15.18487677 14466";

    /// Same plane as DUTHSat-2, about 1.9 degrees further along track.
    pub const LEADER_L1: &str =
        "1 64533U 25135F   25267.31645216  .00019005  00000-0  92304-3 0  9993";
    pub const LEADER_L2: &str =
        "2 64533  97.4549  20.3503 0005468  29.9791 332.0755 15.18487677 14468";

    pub fn duthsat2() -> super::OrbitalElementSet {
        super::OrbitalElementSet::from_lines("DUTHSat-2", DUTHSAT2_L1, DUTHSAT2_L2).unwrap()
    }

    pub fn leader() -> super::OrbitalElementSet {
        super::OrbitalElementSet::from_lines("LEADER", LEADER_L1, LEADER_L2).unwrap()
    }
}
