//! Site (`.qth`) record format.
//!
//! One field per line: site name, latitude (degrees north), longitude
//! (degrees _west_, 0 to 360), and antenna height above ground.

use crate::error::SplatError;
use std::{fmt, fs, path::Path, str::FromStr};

pub const TX_NAME: &str = "TX";
pub const RX_NAME: &str = "RX";

#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub name: String,
    /// Degrees north.
    pub lat: f64,
    /// Degrees west, in `[0, 360)`.
    pub lon_west: f64,
    /// Antenna height above ground (meters).
    pub height_m: u32,
}

impl SiteRecord {
    /// Returns a site record for an east-positive longitude.
    pub fn new(name: &str, lat: f64, lon: f64, height_m: u32) -> Self {
        Self {
            name: name.to_owned(),
            lat,
            lon_west: west_longitude(lon),
            height_m,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SplatError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SplatError> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl fmt::Display for SiteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{:.6}", self.lat)?;
        writeln!(f, "{:.6}", self.lon_west)?;
        writeln!(f, "{}", self.height_m)
    }
}

impl FromStr for SiteRecord {
    type Err = SplatError;

    fn from_str(s: &str) -> Result<Self, SplatError> {
        let mut lines = s.lines().map(str::trim);
        let mut next = |what: &str| {
            lines
                .next()
                .filter(|line| !line.is_empty())
                .ok_or_else(|| malformed(format!("missing {what}")))
        };
        let name = next("name")?.to_owned();
        let lat = next("latitude")?;
        let lat = lat
            .parse()
            .map_err(|_| malformed(format!("invalid latitude {lat:?}")))?;
        let lon = next("longitude")?;
        let lon_west = lon
            .parse()
            .map_err(|_| malformed(format!("invalid longitude {lon:?}")))?;
        let height = next("height")?;
        let height_m = height
            .parse()
            .map_err(|_| malformed(format!("invalid height {height:?}")))?;
        Ok(Self {
            name,
            lat,
            lon_west,
            height_m,
        })
    }
}

/// Converts an east-positive longitude to degrees west in `[0, 360)`.
fn west_longitude(lon: f64) -> f64 {
    let west = (360.0 - lon).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if west >= 360.0 {
        0.0
    } else {
        west
    }
}

fn malformed(reason: String) -> SplatError {
    SplatError::Record {
        file: "qth".into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::{west_longitude, SiteRecord};

    #[test]
    fn test_west_longitude() {
        assert_eq!(west_longitude(0.0), 0.0);
        assert_eq!(west_longitude(90.0), 270.0);
        assert_eq!(west_longitude(-71.5), 71.5);
        assert_eq!(west_longitude(180.0), 180.0);
    }

    #[test]
    fn test_format() {
        let site = SiteRecord::new("TX", 59.973858, 30.316145, 50);
        assert_eq!(site.to_string(), "TX\n59.973858\n329.683855\n50\n");
    }

    #[test]
    fn test_round_trip() {
        let site = SiteRecord::new("RX", -33.8688, 151.2093, 12);
        let written = site.to_string();
        let parsed: SiteRecord = written.parse().unwrap();
        assert_eq!(parsed.to_string(), written);
        assert_eq!(parsed.name, "RX");
        assert_eq!(parsed.height_m, 12);
    }

    #[test]
    fn test_malformed() {
        assert!("TX\n59.9\n".parse::<SiteRecord>().is_err());
        assert!("TX\nnorth\n30.0\n10\n".parse::<SiteRecord>().is_err());
        assert!("TX\n59.9\n30.0\n-10\n".parse::<SiteRecord>().is_err());
    }
}
