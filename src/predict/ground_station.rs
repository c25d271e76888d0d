use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

/// A named observer on the WGS-84 ellipsoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroundStation {
    pub name: String,
    #[serde(rename = "lat")]
    pub latitude_deg: f64,
    #[serde(rename = "lng")]
    pub longitude_deg: f64,
    #[serde(rename = "hgt_km", default)]
    pub altitude_km: f64,
}

impl GroundStation {
    pub fn new(name: &str, latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(format!(
                "station {}: latitude {} out of range",
                self.name, self.latitude_deg
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err(format!(
                "station {}: longitude {} out of range",
                self.name, self.longitude_deg
            ));
        }
        Ok(())
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_km * 1000.0
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let sin_lon = lon.sin();
        let cos_lon = lon.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let x = (n + self.altitude_km) * cos_lat * cos_lon;
        let y = (n + self.altitude_km) * cos_lat * sin_lon;
        let z = (n * (1.0 - WGS84_E2) + self.altitude_km) * sin_lat;
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equator_station_sits_on_semi_major_axis() {
        let gs = GroundStation::new("eq", 0.0, 0.0, 0.0);
        let [x, y, z] = gs.position_ecef_km();
        assert_abs_diff_eq!(x, WGS84_A_KM, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn pole_station_radius_is_polar_radius() {
        let gs = GroundStation::new("pole", 90.0, 0.0, 0.0);
        let [_, _, z] = gs.position_ecef_km();
        assert_abs_diff_eq!(z, 6356.752, epsilon = 1e-3);
    }

    #[test]
    fn deserializes_dashboard_field_names() {
        let gs: GroundStation = serde_yaml::from_str(
            "name: Greece (DUTH)\nlat: 41.1419\nlng: 24.8900\nhgt_km: 0.076\n",
        )
        .unwrap();
        assert_eq!(gs.name, "Greece (DUTH)");
        assert_abs_diff_eq!(gs.altitude_m(), 76.0, epsilon = 1e-9);
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        assert!(GroundStation::new("bad", 91.0, 0.0, 0.0).validate().is_err());
        assert!(GroundStation::new("ok", -53.04, -70.84, 0.0).validate().is_ok());
    }
}
