use serde::{Deserialize, Serialize};

const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    pub const fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Latitude clamped to [-90, 90], longitude wrapped into [-180, 180].
    pub fn clamped(self) -> Self {
        let lat = if self.lat.is_nan() {
            0.
        } else {
            self.lat.clamp(-90., 90.)
        };

        let lon = if self.lon.is_finite() {
            let wrapped = (self.lon + 180.).rem_euclid(360.) - 180.;
            // Keep the antimeridian on the side the caller gave us.
            if wrapped == -180. && self.lon > 0. {
                180.
            } else {
                wrapped
            }
        } else {
            0.
        };

        Self { lat, lon }
    }

    /// Great-circle distance, truncated to whole miles.
    pub fn distance_in_miles(&self, other: &GeoPoint) -> u32 {
        let lat_1 = (self.lat as f64).to_radians();
        let lat_2 = (other.lat as f64).to_radians();
        let d_lat = lat_2 - lat_1;
        let d_lon = (other.lon as f64 - self.lon as f64).to_radians();

        let a = (d_lat / 2.).sin().powi(2) + lat_1.cos() * lat_2.cos() * (d_lon / 2.).sin().powi(2);
        let c = 2. * a.sqrt().atan2((1. - a).sqrt());

        (EARTH_RADIUS_MILES * c) as u32
    }
}

impl From<geo::Point<f32>> for GeoPoint {
    fn from(point: geo::Point<f32>) -> Self {
        Self {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

impl From<GeoPoint> for geo::Point<f32> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}

/// A person shown on the globe, as handed over by the data provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    /// Emoji or other short glyph drawn on the contact's badge.
    pub avatar: String,
    pub location: GeoPoint,
}

impl Contact {
    pub fn new(id: impl Into<String>, avatar: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            avatar: avatar.into(),
            location,
        }
    }
}
