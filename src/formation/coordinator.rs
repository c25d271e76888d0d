use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::{next_pass, GroundStation, PassWindow};

use super::mission::Satellite;
use super::oracle::{PassOracle, StationPasses};

/// Earliest pass at one station across a formation, tagged with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BestPass {
    pub satellite: String,
    pub window: PassWindow,
}

/// Folds per-member results, in member order, into the earliest window per
/// station. An in-progress pass beats any upcoming one; exact ties keep the
/// first member listed.
pub fn merge_best_passes<'a, I>(
    results: I,
    stations: &[GroundStation],
) -> BTreeMap<String, BestPass>
where
    I: IntoIterator<Item = (&'a str, &'a StationPasses)>,
{
    let mut best: BTreeMap<String, BestPass> = BTreeMap::new();

    for (satellite, passes) in results {
        for station in stations {
            let Some(Some(window)) = passes.get(&station.name) else {
                continue;
            };
            let earlier = best
                .get(&station.name)
                .is_none_or(|current| window.aos < current.window.aos);
            if earlier {
                best.insert(
                    station.name.clone(),
                    BestPass {
                        satellite: satellite.to_string(),
                        window: *window,
                    },
                );
            }
        }
    }

    best
}

/// Synchronous coordinator over the in-process resolver.
pub fn best_pass_per_station(
    members: &[Satellite],
    stations: &[GroundStation],
    after: DateTime<Utc>,
    horizon: Duration,
) -> BTreeMap<String, BestPass> {
    let results: Vec<(&str, StationPasses)> = members
        .iter()
        .filter_map(|sat| {
            let elements = sat.elements()?;
            let passes = stations
                .iter()
                .map(|station| {
                    let window = next_pass(elements, station, after, horizon).unwrap_or_else(|e| {
                        log::warn!("Skipping {} over {}: {}", sat.name, station.name, e);
                        None
                    });
                    (station.name.clone(), window)
                })
                .collect();
            Some((sat.name.as_str(), passes))
        })
        .collect();

    merge_best_passes(results.iter().map(|(n, p)| (*n, p)), stations)
}

/// Same aggregation through a [`PassOracle`]. A member whose lookup fails
/// contributes nothing; `None` when every lookup failed.
pub async fn resolve_best_passes<O: PassOracle>(
    oracle: &O,
    members: &[Satellite],
    stations: &[GroundStation],
    after: DateTime<Utc>,
) -> Option<BTreeMap<String, BestPass>> {
    let mut results = Vec::new();
    let mut attempted = 0;

    for sat in members {
        let Some(elements) = sat.elements() else {
            continue;
        };
        attempted += 1;
        match oracle.next_passes(elements, stations, after).await {
            Ok(passes) => results.push((sat.name.as_str(), passes)),
            Err(e) => log::warn!("Visibility lookup for {} failed: {}", sat.name, e),
        }
    }

    if attempted > 0 && results.is_empty() {
        return None;
    }
    Some(merge_best_passes(
        results.iter().map(|(n, p)| (*n, p)),
        stations,
    ))
}
