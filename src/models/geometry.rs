use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Kilometres per degree, the flat approximation used for buffering.
///
/// Only reasonable near mid-latitudes: a degree of longitude shrinks with
/// cos(latitude), so boxes get narrower on the ground towards the poles.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Decimal-degree WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinate(
                "Latitude must be between -90 and 90 degrees".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinate(
                "Longitude must be between -180 and 180 degrees".to_string(),
            ));
        }
        Ok(Coordinate { lon, lat })
    }

    /// Parse the "lat, lon" form typed at the prompt.
    pub fn parse_lat_lon(s: &str) -> Result<Self> {
        let invalid =
            || Error::InvalidCoordinate("Invalid format. Please use: latitude, longitude".into());

        let (lat_str, lon_str) = s.split_once(',').ok_or_else(invalid)?;
        if lon_str.contains(',') {
            return Err(invalid());
        }
        let lat: f64 = lat_str.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon_str.trim().parse().map_err(|_| invalid())?;

        Coordinate::new(lon, lat)
    }

    /// Square box of `buffer_deg` either side of the point.
    pub fn buffer_degrees(&self, buffer_deg: f64) -> Result<BoundingBox> {
        BoundingBox::new(
            self.lon - buffer_deg,
            self.lat - buffer_deg,
            self.lon + buffer_deg,
            self.lat + buffer_deg,
        )
    }

    /// Square box of `buffer_km` either side of the point, at 111 km per degree.
    pub fn buffer_km(&self, buffer_km: f64) -> Result<BoundingBox> {
        self.buffer_degrees(km_to_degrees(buffer_km))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°N, {:.4}°E", self.lat, self.lon)
    }
}

pub fn km_to_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingBox {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<Self> {
        if !(minx < maxx && miny < maxy) {
            return Err(Error::InvalidBoundingBox(format!(
                "({minx}, {miny}, {maxx}, {maxy}) is empty or inverted"
            )));
        }
        Ok(BoundingBox {
            minx,
            miny,
            maxx,
            maxy,
        })
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.minx, self.miny),
            (self.minx, self.maxy),
            (self.maxx, self.miny),
            (self.maxx, self.maxy),
        ]
    }

    /// Envelope of a set of points, e.g. reprojected corners.
    pub fn envelope(points: &[(f64, f64)]) -> Result<Self> {
        let mut minx = f64::INFINITY;
        let mut miny = f64::INFINITY;
        let mut maxx = f64::NEG_INFINITY;
        let mut maxy = f64::NEG_INFINITY;
        for &(x, y) in points {
            minx = minx.min(x);
            miny = miny.min(y);
            maxx = maxx.max(x);
            maxy = maxy.max(y);
        }
        BoundingBox::new(minx, miny, maxx, maxy)
    }

    /// `[west, south, east, north]`, the STAC bbox order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.minx, self.miny, self.maxx, self.maxy]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4}, {:.4} to {:.4}, {:.4}",
            self.minx, self.miny, self.maxx, self.maxy
        )
    }
}
