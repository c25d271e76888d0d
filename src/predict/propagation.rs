use chrono::{DateTime, Utc};

use crate::predict::error::PredictError;
use crate::predict::ground_station::{GroundStation, EARTH_ROTATION_RAD_S, WGS84_A_KM, WGS84_E2};
use crate::predict::types::{LookAngles, SubPoint};
use crate::predict::OrbitalElementSet;

struct EcefState {
    position: [f64; 3],
    velocity: [f64; 3],
}

fn propagate_ecef(
    elements: &OrbitalElementSet,
    timestamp: DateTime<Utc>,
) -> Result<EcefState, PredictError> {
    let minutes = elements.minutes_since_epoch(timestamp)?;
    let prediction = elements.constants().propagate(minutes)?;

    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    Ok(EcefState {
        position: teme_to_ecef_position(prediction.position, sidereal),
        velocity: teme_to_ecef_velocity(prediction.position, prediction.velocity, sidereal),
    })
}

/// Geodetic sub-point of the satellite at `timestamp`. Instants before the
/// element epoch are extrapolated like any other.
pub fn position(
    elements: &OrbitalElementSet,
    timestamp: DateTime<Utc>,
) -> Result<SubPoint, PredictError> {
    let state = propagate_ecef(elements, timestamp)?;
    let (latitude_deg, longitude_deg, altitude_km) = ecef_to_geodetic(state.position);

    Ok(SubPoint {
        timestamp,
        latitude_deg,
        longitude_deg,
        altitude_km,
    })
}

/// Elevation, azimuth, range and range rate of the satellite seen from `station`.
pub fn look_angles(
    elements: &OrbitalElementSet,
    timestamp: DateTime<Utc>,
    station: &GroundStation,
) -> Result<LookAngles, PredictError> {
    let state = propagate_ecef(elements, timestamp)?;
    let sta_ecef = station.position_ecef_km();

    let dr = [
        state.position[0] - sta_ecef[0],
        state.position[1] - sta_ecef[1],
        state.position[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let enu = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth = enu.0.atan2(enu.1).to_degrees().rem_euclid(360.0);
    let elevation = if range_km > 0.0 {
        (enu.2 / range_km).asin().to_degrees()
    } else {
        0.0
    };

    // The station is at rest in the rotating frame.
    let range_rate_km_s = if range_km > 0.0 {
        (state.velocity[0] * dr[0] + state.velocity[1] * dr[1] + state.velocity[2] * dr[2])
            / range_km
    } else {
        0.0
    };

    Ok(LookAngles {
        timestamp,
        elevation_deg: elevation,
        azimuth_deg: azimuth,
        range_km,
        range_rate_km_s,
        velocity_km_s: range_rate_km_s.abs(),
    })
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn teme_to_ecef_velocity(pos_teme: [f64; 3], vel_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = [
        vel_teme[0] * cos_gmst + vel_teme[1] * sin_gmst,
        -vel_teme[0] * sin_gmst + vel_teme[1] * cos_gmst,
        vel_teme[2],
    ];
    let rotation = [
        -EARTH_ROTATION_RAD_S * pos[1],
        EARTH_ROTATION_RAD_S * pos[0],
        0.0,
    ];
    [
        rotated[0] - rotation[0],
        rotated[1] - rotation[1],
        rotated[2] - rotation[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// WGS-84 geodetic latitude, longitude (degrees) and height (km).
pub fn ecef_to_geodetic(pos: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = pos;
    let longitude = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    if p < 1e-9 {
        let polar_radius = WGS84_A_KM * (1.0 - WGS84_E2).sqrt();
        let latitude: f64 = if z < 0.0 { -90.0 } else { 90.0 };
        return (latitude, 0.0, z.abs() - polar_radius);
    }

    let mut latitude = z.atan2(p * (1.0 - WGS84_E2));
    let mut height = 0.0;
    for _ in 0..8 {
        let sin_lat = latitude.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        height = p / latitude.cos() - n;

        let prev = latitude;
        latitude = (z / p).atan2(1.0 - WGS84_E2 * n / (n + height));
        if (latitude - prev).abs() < 1e-12 {
            break;
        }
    }

    (latitude.to_degrees(), longitude.to_degrees(), height)
}
