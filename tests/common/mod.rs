#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sat_o_vis::predict::{GroundStation, OrbitalElementSet};

pub const DUTHSAT2_L1: &str =
    "1 64532U 25135E   25267.31645216  .00019005  00000-0  92304-3 0  9992";
pub const DUTHSAT2_L2: &str =
    "2 64532  97.4549  20.3503 0005468  29.9791 330.1755 15.18487677 14466";
pub const LEADER_L1: &str =
    "1 64533U 25135F   25267.31645216  .00019005  00000-0  92304-3 0  9993";
pub const LEADER_L2: &str =
    "2 64533  97.4549  20.3503 0005468  29.9791 332.0755 15.18487677 14468";

pub fn duthsat2() -> OrbitalElementSet {
    OrbitalElementSet::from_lines("DUTHSat-2", DUTHSAT2_L1, DUTHSAT2_L2).unwrap()
}

pub fn leader() -> OrbitalElementSet {
    OrbitalElementSet::from_lines("Leader", LEADER_L1, LEADER_L2).unwrap()
}

pub fn duth() -> GroundStation {
    GroundStation::new("Greece (DUTH)", 41.1419, 24.89, 0.076)
}

pub fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 8, 0, 0).unwrap()
}

/// Two missions sharing one station list: DUTHSat-2 alone, a two-satellite
/// formation, and a satellite that has not launched yet.
pub fn config_yaml() -> String {
    format!(
        r#"
tracker:
  track_step: 30s
  track_window_samples: 20
missions:
  - name: DUTHSat-2
    stations:
      - {{ name: Greece (DUTH), lat: 41.1419, lng: 24.8900, hgt_km: 0.076 }}
      - {{ name: Athens, lat: 37.98381, lng: 23.72754 }}
    satellite:
      tle: |
        {d1}
        {d2}
  - name: Pair
    selected_role: primary
    stations:
      - {{ name: Greece (DUTH), lat: 41.1419, lng: 24.8900, hgt_km: 0.076 }}
    satellites:
      - name: Trailer
        role: primary
        tle: |
          {d1}
          {d2}
      - name: Leader
        role: secondary
        tle: |
          {l1}
          {l2}
  - name: PeakSat
    stations:
      - {{ name: Athens, lat: 37.98381, lng: 23.72754 }}
    satellite:
      planned_launch: February 2026
"#,
        d1 = DUTHSAT2_L1,
        d2 = DUTHSAT2_L2,
        l1 = LEADER_L1,
        l2 = LEADER_L2
    )
}
