use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::propagation::position;
use crate::predict::types::Track;
use crate::predict::OrbitalElementSet;

/// Sample the ground track around `center`: `window_samples` points on each
/// side, `step` apart. A satellite without elements has no track.
pub fn sample_track(
    elements: Option<&OrbitalElementSet>,
    center: DateTime<Utc>,
    step: Duration,
    window_samples: usize,
) -> Result<Option<Track>, PredictError> {
    if step <= Duration::zero() {
        return Err(PredictError::InvalidStep);
    }
    let Some(elements) = elements else {
        return Ok(None);
    };

    let mut past = Vec::with_capacity(window_samples);
    for i in (1..=window_samples as i32).rev() {
        past.push(position(elements, center - step * i)?);
    }

    let current = position(elements, center)?;

    let mut future = Vec::with_capacity(window_samples);
    for i in 1..=window_samples as i32 {
        future.push(position(elements, center + step * i)?);
    }

    Ok(Some(Track {
        past,
        current,
        future,
    }))
}

/// Samples needed on each side to cover one orbital period.
pub fn samples_per_orbit(elements: &OrbitalElementSet, step: Duration) -> usize {
    let step_ms = step.num_milliseconds();
    if step_ms <= 0 {
        return 0;
    }
    let period_ms = elements.orbital_period().num_milliseconds();
    ((period_ms + step_ms - 1) / step_ms) as usize
}
