use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::error::TrackerError;
use super::snapshot::{SatelliteLook, SatelliteView, Snapshot, StationView, VisibilityStatus};
use crate::config::{Config, TrackerConfig};
use crate::feed::ElementFeed;
use crate::formation::{
    resolve_best_passes, AnyOracle, BestPass, ElementStatus, HttpOracle, LocalOracle, Mission,
    MissionCatalog, Satellite,
};
use crate::predict::{
    look_angles, position, sample_track, samples_per_orbit, GroundStation, Track,
};

const LOOKUP_QUEUE: usize = 16;

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub refresh_interval: StdDuration,
    pub track_step: Duration,
    /// Samples either side of now; one orbit when unset.
    pub track_window_samples: Option<usize>,
    pub track_lifetime: Duration,
}

impl From<&TrackerConfig> for TrackerSettings {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval,
            track_step: Duration::from_std(config.track_step)
                .unwrap_or_else(|_| Duration::seconds(10)),
            track_window_samples: config.track_window_samples,
            track_lifetime: Duration::from_std(config.track_lifetime)
                .unwrap_or_else(|_| Duration::minutes(10)),
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

/// Which mission (and which member of a formation) is on screen.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ActiveContext {
    pub mission: String,
    pub satellite: Option<String>,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub generation: u64,
    pub tick_id: u64,
    pub at: DateTime<Utc>,
    pub members: Vec<Satellite>,
    pub stations: Vec<GroundStation>,
}

#[derive(Debug, Clone)]
pub struct LookupResult {
    pub generation: u64,
    pub tick_id: u64,
    pub at: DateTime<Utc>,
    /// `None` when the lookup failed outright.
    pub passes: Option<BTreeMap<String, BestPass>>,
}

#[derive(Debug)]
struct TrackCache {
    sampled_at: DateTime<Utc>,
    tracks: BTreeMap<String, Track>,
}

#[derive(Debug, Default)]
struct Visibility {
    applied_tick: u64,
    passes: BTreeMap<String, BestPass>,
    status: VisibilityStatus,
}

#[derive(Debug)]
struct Engine {
    settings: TrackerSettings,
    mission: Mission,
    active: ActiveContext,
    tick_id: u64,
    tracks: Option<TrackCache>,
    visibility: Visibility,
    latest: Option<Snapshot>,
}

impl Engine {
    fn new(settings: TrackerSettings, mission: Mission) -> Self {
        let active = ActiveContext {
            mission: mission.name.clone(),
            satellite: None,
            generation: 0,
        };
        Self {
            settings,
            mission,
            active,
            tick_id: 0,
            tracks: None,
            visibility: Visibility::default(),
            latest: None,
        }
    }

    fn switch(&mut self, mission: Mission, satellite: Option<String>) -> ActiveContext {
        self.active = ActiveContext {
            mission: mission.name.clone(),
            satellite,
            generation: self.active.generation + 1,
        };
        self.mission = mission;
        self.tracks = None;
        self.visibility = Visibility::default();
        self.latest = None;
        self.active.clone()
    }

    fn selected_name(&self) -> Option<String> {
        match &self.active.satellite {
            Some(name) => Some(name.clone()),
            None => self.mission.selected(None).map(|s| s.name.clone()),
        }
    }

    fn refresh_tracks(&mut self, now: DateTime<Utc>) {
        let fresh = self
            .tracks
            .as_ref()
            .is_some_and(|cache| now - cache.sampled_at < self.settings.track_lifetime);
        if fresh {
            return;
        }

        let step = self.settings.track_step;
        let mut tracks = BTreeMap::new();
        for sat in self.mission.members() {
            let Some(elements) = sat.elements() else {
                continue;
            };
            let samples = self
                .settings
                .track_window_samples
                .unwrap_or_else(|| samples_per_orbit(elements, step));
            match sample_track(Some(elements), now, step, samples) {
                Ok(Some(track)) => {
                    tracks.insert(sat.name.clone(), track);
                }
                Ok(None) => {}
                Err(e) => log::warn!("Track sampling failed for {}: {}", sat.name, e),
            }
        }

        log::debug!(
            "Resampled {} track(s) for {} at {}",
            tracks.len(),
            self.mission.name,
            now
        );
        self.tracks = Some(TrackCache {
            sampled_at: now,
            tracks,
        });
    }

    fn satellite_view(&self, sat: &Satellite, now: DateTime<Utc>) -> SatelliteView {
        let elements = sat.elements();
        let sub_point = elements.and_then(|el| match position(el, now) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("Propagation failed for {}: {}", sat.name, e);
                None
            }
        });
        let track = self
            .tracks
            .as_ref()
            .and_then(|cache| cache.tracks.get(&sat.name));

        SatelliteView {
            name: sat.name.clone(),
            role: sat.role,
            epoch: elements.map(|el| el.epoch()),
            planned_launch: match elements {
                Some(_) => None,
                None => sat.planned_launch.clone(),
            },
            elements_error: match &sat.elements {
                ElementStatus::Invalid(message) => Some(message.clone()),
                _ => None,
            },
            sub_point,
            past_track: track.map(Track::past_segments).unwrap_or_default(),
            future_track: track.map(Track::future_segments).unwrap_or_default(),
        }
    }

    fn station_view(&self, station: &GroundStation, now: DateTime<Utc>) -> StationView {
        let look_angles = self
            .mission
            .members()
            .iter()
            .filter_map(|sat| {
                let elements = sat.elements()?;
                match look_angles(elements, now, station) {
                    Ok(angles) => Some(SatelliteLook {
                        satellite: sat.name.clone(),
                        angles,
                    }),
                    Err(e) => {
                        log::warn!(
                            "Look angles failed for {} at {}: {}",
                            sat.name,
                            station.name,
                            e
                        );
                        None
                    }
                }
            })
            .collect();

        StationView {
            station: station.clone(),
            look_angles,
            best_pass: self.visibility.passes.get(&station.name).cloned(),
        }
    }

    fn tick(&mut self, now: DateTime<Utc>) -> (Snapshot, Option<LookupRequest>) {
        self.tick_id += 1;
        self.refresh_tracks(now);

        let satellites = self
            .mission
            .members()
            .iter()
            .map(|sat| self.satellite_view(sat, now))
            .collect();
        let stations = self
            .mission
            .stations
            .iter()
            .map(|gs| self.station_view(gs, now))
            .collect();

        let snapshot = Snapshot {
            tick_id: self.tick_id,
            timestamp: now,
            mission: self.mission.name.clone(),
            generation: self.active.generation,
            formation: self.mission.is_formation(),
            selected: self.selected_name(),
            satellites,
            stations,
            visibility: self.visibility.status.clone(),
        };
        self.latest = Some(snapshot.clone());

        let request = self.mission.has_elements().then(|| LookupRequest {
            generation: self.active.generation,
            tick_id: self.tick_id,
            at: now,
            members: self.mission.members().to_vec(),
            stations: self.mission.stations.clone(),
        });

        (snapshot, request)
    }

    /// Applies a lookup unless it belongs to an older context or an older
    /// tick than the last one applied.
    fn apply(&mut self, result: LookupResult) -> bool {
        if result.generation != self.active.generation {
            log::debug!(
                "Dropping visibility for generation {} (active {})",
                result.generation,
                self.active.generation
            );
            return false;
        }
        if result.tick_id <= self.visibility.applied_tick {
            log::debug!(
                "Dropping visibility for tick {} (already at {})",
                result.tick_id,
                self.visibility.applied_tick
            );
            return false;
        }

        self.visibility.applied_tick = result.tick_id;
        match result.passes {
            Some(passes) => {
                self.visibility.passes = passes;
                self.visibility.status = VisibilityStatus {
                    stale: false,
                    updated_tick: Some(result.tick_id),
                    updated_at: Some(result.at),
                };
            }
            None => {
                self.visibility.status.stale = true;
                log::debug!(
                    "Visibility lookup for tick {} failed, keeping {:?}",
                    result.tick_id,
                    self.visibility.status.updated_tick
                );
            }
        }

        if let Some(latest) = self.latest.as_mut() {
            for view in &mut latest.stations {
                view.best_pass = self.visibility.passes.get(&view.station.name).cloned();
            }
            latest.visibility = self.visibility.status.clone();
        }
        true
    }
}

async fn lookup(oracle: &AnyOracle, request: LookupRequest) -> LookupResult {
    let passes =
        resolve_best_passes(oracle, &request.members, &request.stations, request.at).await;
    LookupResult {
        generation: request.generation,
        tick_id: request.tick_id,
        at: request.at,
        passes,
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Tick-driven live engine over a mission catalog.
pub struct Tracker {
    catalog: Arc<MissionCatalog>,
    oracle: Arc<AnyOracle>,
    refresh_interval: StdDuration,
    shared: Arc<StdMutex<Engine>>,
    snapshot_tx: watch::Sender<Option<Snapshot>>,
    worker: Option<WorkerHandle>,
}

impl Tracker {
    pub fn new(
        catalog: MissionCatalog,
        settings: TrackerSettings,
        initial_mission: Option<&str>,
        oracle: AnyOracle,
    ) -> Result<Self, TrackerError> {
        let mission = match initial_mission {
            Some(name) => catalog
                .get(name)
                .ok_or_else(|| TrackerError::UnknownMission(name.to_string()))?,
            None => catalog.first().ok_or(TrackerError::NoMissions)?,
        }
        .clone();

        let refresh_interval = settings.refresh_interval;
        let (snapshot_tx, _) = watch::channel(None);
        Ok(Self {
            catalog: Arc::new(catalog),
            oracle: Arc::new(oracle),
            refresh_interval,
            shared: Arc::new(StdMutex::new(Engine::new(settings, mission))),
            snapshot_tx,
            worker: None,
        })
    }

    /// Builds missions from the configuration, resolving element sets
    /// through `feed`, and picks the oracle.
    pub fn from_config(config: &Config, feed: &ElementFeed) -> Result<Self, TrackerError> {
        let catalog = MissionCatalog::from_config(&config.missions, feed);
        let horizon = Duration::from_std(config.tracker.pass_horizon)
            .unwrap_or_else(|_| Duration::hours(24));
        let oracle = match &config.oracle.url {
            Some(url) => AnyOracle::Http(HttpOracle::new(url, config.feed.timeout)?),
            None => AnyOracle::Local(LocalOracle::new(horizon)),
        };
        Self::new(
            catalog,
            TrackerSettings::from(&config.tracker),
            config.tracker.initial_mission.as_deref(),
            oracle,
        )
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    pub fn active(&self) -> ActiveContext {
        self.shared.lock().unwrap().active.clone()
    }

    /// Swaps the active mission. Cached tracks and visibility are dropped and
    /// lookups still in flight for the old context will be ignored.
    pub fn select(
        &mut self,
        mission: &str,
        satellite: Option<&str>,
    ) -> Result<ActiveContext, TrackerError> {
        let mission = self
            .catalog
            .get(mission)
            .ok_or_else(|| TrackerError::UnknownMission(mission.to_string()))?;
        if let Some(name) = satellite {
            if mission.member(name).is_none() {
                return Err(TrackerError::UnknownSatellite {
                    mission: mission.name.clone(),
                    satellite: name.to_string(),
                });
            }
        }

        let mut engine = self.shared.lock().unwrap();
        let active = engine.switch(mission.clone(), satellite.map(str::to_string));
        self.snapshot_tx.send_replace(None);
        log::info!(
            "Active mission is now {} (generation {})",
            active.mission,
            active.generation
        );
        Ok(active)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// One tick evaluated at `now`, waiting for its visibility lookup.
    pub async fn step(&self, now: DateTime<Utc>) -> Snapshot {
        let (snapshot, request) = {
            let mut engine = self.shared.lock().unwrap();
            let (snapshot, request) = engine.tick(now);
            self.snapshot_tx.send_replace(Some(snapshot.clone()));
            (snapshot, request)
        };

        let Some(request) = request else {
            return snapshot;
        };
        let result = lookup(&self.oracle, request).await;

        let mut engine = self.shared.lock().unwrap();
        if engine.apply(result) {
            if let Some(latest) = engine.latest.clone() {
                self.snapshot_tx.send_replace(Some(latest.clone()));
                return latest;
            }
        }
        snapshot
    }

    pub fn start(&mut self) -> Result<(), TrackerError> {
        if self.worker.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }

        let shared = self.shared.clone();
        let oracle = self.oracle.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let interval = self.refresh_interval;
        let (stop_tx, stop_rx) = oneshot::channel();

        let join = tokio::spawn(run_tick_loop(shared, oracle, snapshot_tx, interval, stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });
        log::info!("Tracker started, refreshing every {:?}", interval);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
            log::info!("Tracker stopped");
        }
    }
}

async fn run_tick_loop(
    shared: Arc<StdMutex<Engine>>,
    oracle: Arc<AnyOracle>,
    snapshot_tx: watch::Sender<Option<Snapshot>>,
    interval: StdDuration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let (result_tx, mut result_rx) = mpsc::channel::<LookupResult>(LOOKUP_QUEUE);
    let mut next = Instant::now();

    loop {
        tokio::select! {
            _ = sleep_until(next) => {
                next += interval;
                let request = {
                    let mut engine = shared.lock().unwrap();
                    let (snapshot, request) = engine.tick(Utc::now());
                    snapshot_tx.send_replace(Some(snapshot));
                    request
                };
                if let Some(request) = request {
                    let oracle = oracle.clone();
                    let tx = result_tx.clone();
                    tokio::spawn(async move {
                        let result = lookup(&oracle, request).await;
                        let _ = tx.send(result).await;
                    });
                }
            }
            Some(result) = result_rx.recv() => {
                let mut engine = shared.lock().unwrap();
                if engine.apply(result) {
                    if let Some(latest) = engine.latest.clone() {
                        snapshot_tx.send_replace(Some(latest));
                    }
                }
            }
            _ = &mut stop_rx => break,
        }
    }
}
