use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::ground_station::GroundStation;
use crate::predict::propagation::look_angles;
use crate::predict::types::{Aos, Pass, PassWindow};
use crate::predict::OrbitalElementSet;

const COARSE_STEP_SECONDS: i64 = 30;
const FINE_STEP_SECONDS: i64 = 1;
const HORIZON_ELEVATION: f64 = 0.0;

pub const DEFAULT_SEARCH_HORIZON: Duration = Duration::hours(24);

fn elevation_at(
    elements: &OrbitalElementSet,
    station: &GroundStation,
    timestamp: DateTime<Utc>,
) -> Result<f64, PredictError> {
    Ok(look_angles(elements, timestamp, station)?.elevation_deg)
}

pub fn is_currently_visible(
    elements: &OrbitalElementSet,
    station: &GroundStation,
    at: DateTime<Utc>,
) -> Result<bool, PredictError> {
    Ok(elevation_at(elements, station, at)? > HORIZON_ELEVATION)
}

/// Next transit of `elements` over `station` at or after `after`, searched
/// up to `horizon` ahead. A pass already under way reports `Aos::InProgress`.
pub fn next_pass(
    elements: &OrbitalElementSet,
    station: &GroundStation,
    after: DateTime<Utc>,
    horizon: Duration,
) -> Result<Option<PassWindow>, PredictError> {
    let end = after + horizon;
    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);

    let start_elevation = elevation_at(elements, station, after)?;
    let in_progress = start_elevation > HORIZON_ELEVATION;

    let mut aos = if in_progress {
        Some(Aos::InProgress)
    } else {
        None
    };
    let mut max_el = if in_progress {
        start_elevation
    } else {
        f64::NEG_INFINITY
    };
    let mut prev_time = after;
    let mut prev_visible = in_progress;

    while prev_time < end {
        let cursor = (prev_time + coarse_step).min(end);
        let elevation = elevation_at(elements, station, cursor)?;
        let visible = elevation > HORIZON_ELEVATION;

        if visible && !prev_visible {
            let rise = refine_crossing(elements, station, prev_time, cursor, true)?;
            aos = Some(Aos::Upcoming(rise));
            max_el = elevation;
        } else if visible {
            max_el = max_el.max(elevation);
        } else if prev_visible {
            let set = refine_crossing(elements, station, prev_time, cursor, false)?;
            return Ok(aos.map(|aos| PassWindow {
                aos,
                los: Some(set),
                max_elevation_deg: Some(round2(max_el)),
            }));
        }

        prev_visible = visible;
        prev_time = cursor;
    }

    // Horizon reached mid-pass
    Ok(aos.map(|aos| PassWindow {
        aos,
        los: None,
        max_elevation_deg: Some(round2(max_el)),
    }))
}

/// Find all passes for a satellite within a time range
pub fn predict_passes(
    station: &GroundStation,
    elements: &OrbitalElementSet,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
) -> Result<Vec<Pass>, PredictError> {
    let mut passes = Vec::new();
    let mut cursor = start;
    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);

    // Passes already under way at `start` are skipped: their AOS is unknown.
    let mut prev_visible = is_currently_visible(elements, station, start)?;
    let mut pass_start: Option<DateTime<Utc>> = None;
    let mut max_el = 0.0;
    let mut max_el_time = cursor;
    let mut aos_az = 0.0;

    while cursor <= end {
        let sample = look_angles(elements, cursor, station)?;
        let visible = sample.elevation_deg > HORIZON_ELEVATION;

        if visible && !prev_visible {
            let aos = refine_crossing(elements, station, cursor - coarse_step, cursor, true)?;
            pass_start = Some(aos);
            aos_az = look_angles(elements, aos, station)?.azimuth_deg;
            max_el = sample.elevation_deg;
            max_el_time = cursor;
        } else if visible && pass_start.is_some() {
            if sample.elevation_deg > max_el {
                max_el = sample.elevation_deg;
                max_el_time = cursor;
            }
        } else if !visible && prev_visible {
            if let Some(aos) = pass_start.take() {
                let los = refine_crossing(elements, station, cursor - coarse_step, cursor, false)?;
                let los_az = look_angles(elements, los, station)?.azimuth_deg;

                if max_el >= min_elevation {
                    passes.push(Pass {
                        satellite: elements.name().to_string(),
                        norad_id: elements.catalog_number(),
                        aos,
                        los,
                        tca: max_el_time,
                        max_elevation_deg: round2(max_el),
                        aos_azimuth_deg: round2(aos_az),
                        los_azimuth_deg: round2(los_az),
                        duration_seconds: (los - aos).num_seconds(),
                    });
                }
            }
            max_el = 0.0;
        }

        prev_visible = visible;
        cursor += coarse_step;
    }

    Ok(passes)
}

/// Binary search to find exact horizon crossing time
fn refine_crossing(
    elements: &OrbitalElementSet,
    station: &GroundStation,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    is_aos: bool, // true = rising, false = setting
) -> Result<DateTime<Utc>, PredictError> {
    let mut low = before;
    let mut high = after;

    while high - low > Duration::seconds(FINE_STEP_SECONDS) {
        let mid = low + (high - low) / 2;
        let above = elevation_at(elements, station, mid)? > HORIZON_ELEVATION;
        if above == is_aos {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(high)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::elements::fixtures::duthsat2;
    use chrono::TimeZone;

    fn duth() -> GroundStation {
        GroundStation::new("Greece (DUTH)", 41.1419, 24.89, 0.076)
    }

    /// First whole minute after 08:00 on the epoch day with nothing overhead.
    fn start() -> DateTime<Utc> {
        let set = duthsat2();
        let mut t = Utc.with_ymd_and_hms(2025, 9, 24, 8, 0, 0).unwrap();
        while is_currently_visible(&set, &duth(), t).unwrap() {
            t += Duration::minutes(1);
        }
        t
    }

    #[test]
    fn several_short_passes_per_day_over_duth() {
        let set = duthsat2();
        let passes =
            predict_passes(&duth(), &set, start(), start() + Duration::days(1), 0.0).unwrap();

        assert!(passes.len() >= 3, "only {} passes", passes.len());
        for pass in &passes {
            assert!(pass.los > pass.aos);
            assert!(pass.duration_seconds <= 13 * 60, "{:?}", pass);
            assert!(pass.tca >= pass.aos - Duration::seconds(COARSE_STEP_SECONDS));
            assert!(pass.tca <= pass.los);
            assert!(pass.max_elevation_deg > 0.0 && pass.max_elevation_deg <= 90.0);
            assert_eq!(pass.norad_id, 64532);
        }
        assert!(passes.iter().any(|p| p.duration_seconds >= 5 * 60));
        assert!(passes.windows(2).all(|w| w[0].los < w[1].aos));
    }

    #[test]
    fn elevation_rises_then_falls_through_a_pass() {
        let set = duthsat2();
        let window = next_pass(&set, &duth(), start(), DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        let aos = window.aos.time().unwrap();
        let los = window.los.unwrap();

        let before = elevation_at(&set, &duth(), aos - Duration::seconds(2)).unwrap();
        let after = elevation_at(&set, &duth(), los + Duration::seconds(2)).unwrap();
        assert!(before <= 0.0 && after <= 0.0);

        let mid = aos + (los - aos) / 2;
        let peak = elevation_at(&set, &duth(), mid).unwrap();
        assert!(peak > 0.0);
        assert!(peak <= window.max_elevation_deg.unwrap() + 1.0);
    }

    #[test]
    fn next_pass_is_idempotent() {
        let set = duthsat2();
        let a = next_pass(&set, &duth(), start(), DEFAULT_SEARCH_HORIZON).unwrap();
        let b = next_pass(&set, &duth(), start(), DEFAULT_SEARCH_HORIZON).unwrap();
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn next_pass_matches_first_listed_pass() {
        let set = duthsat2();
        let window = next_pass(&set, &duth(), start(), DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        let passes =
            predict_passes(&duth(), &set, start(), start() + Duration::days(1), 0.0).unwrap();
        let first = &passes[0];
        assert_eq!(window.aos, Aos::Upcoming(first.aos));
        assert_eq!(window.los, Some(first.los));
    }

    #[test]
    fn in_progress_iff_visible() {
        let set = duthsat2();
        let gs = duth();
        let window = next_pass(&set, &gs, start(), DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        let aos = window.aos.time().unwrap();
        let los = window.los.unwrap();

        let mid = aos + (los - aos) / 2;
        assert!(is_currently_visible(&set, &gs, mid).unwrap());
        let during = next_pass(&set, &gs, mid, DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        assert_eq!(during.aos, Aos::InProgress);
        let drift = (during.los.unwrap() - los).num_milliseconds().abs();
        assert!(drift <= 1000, "LOS moved by {} ms", drift);

        assert!(!is_currently_visible(&set, &gs, start()).unwrap());
        assert!(!window.aos.is_in_progress());
    }

    #[test]
    fn crossings_are_refined_to_one_second() {
        let set = duthsat2();
        let gs = duth();
        let window = next_pass(&set, &gs, start(), DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        let aos = window.aos.time().unwrap();
        let los = window.los.unwrap();
        let one = Duration::seconds(1);

        assert!(elevation_at(&set, &gs, aos).unwrap() > 0.0);
        assert!(elevation_at(&set, &gs, aos - one).unwrap() <= 0.0);
        assert!(elevation_at(&set, &gs, los).unwrap() <= 0.0);
        assert!(elevation_at(&set, &gs, los - one).unwrap() > 0.0);
    }

    #[test]
    fn short_horizon_finds_nothing() {
        let set = duthsat2();
        let window = next_pass(&set, &duth(), start(), DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        let aos = window.aos.time().unwrap();
        let horizon = (aos - start()) - Duration::minutes(2);
        if horizon > Duration::zero() {
            assert_eq!(next_pass(&set, &duth(), start(), horizon).unwrap(), None);
        }
    }

    #[test]
    fn horizon_ending_mid_pass_leaves_los_open() {
        let set = duthsat2();
        let window = next_pass(&set, &duth(), start(), DEFAULT_SEARCH_HORIZON)
            .unwrap()
            .unwrap();
        let aos = window.aos.time().unwrap();
        let horizon = (aos - start()) + Duration::minutes(2);
        let cut = next_pass(&set, &duth(), start(), horizon).unwrap().unwrap();
        assert_eq!(cut.aos, window.aos);
        assert_eq!(cut.los, None);
    }

    #[test]
    fn min_elevation_filters_low_passes() {
        let set = duthsat2();
        let end = start() + Duration::days(1);
        let all = predict_passes(&duth(), &set, start(), end, 0.0).unwrap();
        let high = predict_passes(&duth(), &set, start(), end, 30.0).unwrap();
        assert!(high.len() <= all.len());
        assert!(high.iter().all(|p| p.max_elevation_deg >= 30.0));
    }
}
