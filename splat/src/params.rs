use crate::{
    error::SplatError,
    lrp::EnvironmentRecord,
    qth::{SiteRecord, RX_NAME, TX_NAME},
};
use geo::{point, HaversineDistance};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{RangeBounds, RangeInclusive},
    str::FromStr,
};

/// A code as web forms post it: a number, a flag, or either as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Code {
    Number(u8),
    Flag(bool),
    Text(String),
}

/// Antenna polarization.
///
/// Deserializes from its name, from 0/1, or from a vertical flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "Code")]
pub enum Polarization {
    #[default]
    Horizontal = 0,
    Vertical = 1,
}

impl Polarization {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Horizontal),
            1 => Some(Self::Vertical),
            _ => None,
        }
    }
}

impl TryFrom<Code> for Polarization {
    type Error = SplatError;

    fn try_from(code: Code) -> Result<Self, SplatError> {
        let polarization = match code {
            Code::Number(code) => Self::from_code(code),
            Code::Flag(vertical) => Some(if vertical {
                Self::Vertical
            } else {
                Self::Horizontal
            }),
            Code::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "horizontal" | "0" | "false" => Some(Self::Horizontal),
                "vertical" | "1" | "true" => Some(Self::Vertical),
                _ => None,
            },
        };
        polarization.ok_or_else(|| SplatError::Param {
            field: "polarization",
            reason: "expected horizontal or vertical".to_owned(),
        })
    }
}

/// Radio climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Code", into = "u8")]
pub enum Climate {
    Equatorial = 1,
    ContinentalSubtropical = 2,
    MaritimeSubtropical = 3,
    Desert = 4,
    #[default]
    ContinentalTemperate = 5,
    MaritimeTemperateOverLand = 6,
    MaritimeTemperateOverSea = 7,
}

impl Climate {
    pub fn description(self) -> &'static str {
        match self {
            Self::Equatorial => "Equatorial",
            Self::ContinentalSubtropical => "Continental Subtropical",
            Self::MaritimeSubtropical => "Maritime Subtropical",
            Self::Desert => "Desert",
            Self::ContinentalTemperate => "Continental Temperate",
            Self::MaritimeTemperateOverLand => "Maritime Temperate, over land",
            Self::MaritimeTemperateOverSea => "Maritime Temperate, over sea",
        }
    }
}

impl TryFrom<u8> for Climate {
    type Error = SplatError;

    fn try_from(code: u8) -> Result<Self, SplatError> {
        let climate = match code {
            1 => Self::Equatorial,
            2 => Self::ContinentalSubtropical,
            3 => Self::MaritimeSubtropical,
            4 => Self::Desert,
            5 => Self::ContinentalTemperate,
            6 => Self::MaritimeTemperateOverLand,
            7 => Self::MaritimeTemperateOverSea,
            _ => {
                return Err(SplatError::Param {
                    field: "radio_climate",
                    reason: format!("unknown climate code {code}"),
                })
            }
        };
        Ok(climate)
    }
}

impl TryFrom<Code> for Climate {
    type Error = SplatError;

    fn try_from(code: Code) -> Result<Self, SplatError> {
        match code {
            Code::Number(code) => Self::try_from(code),
            Code::Text(text) => {
                let code = text.trim().parse::<u8>().map_err(|_| SplatError::Param {
                    field: "radio_climate",
                    reason: format!("not a climate code: {text:?}"),
                })?;
                Self::try_from(code)
            }
            Code::Flag(_) => Err(SplatError::Param {
                field: "radio_climate",
                reason: "not a climate code: boolean".to_owned(),
            }),
        }
    }
}

impl From<Climate> for u8 {
    fn from(climate: Climate) -> u8 {
        climate as u8
    }
}

/// Ground presets and their electrical constants.
///
/// | Ground           | Dielectric | Conductivity (S/m) |
/// |------------------|-----------:|-------------------:|
/// | Salt water       |         80 |              5.000 |
/// | Good ground      |         25 |              0.020 |
/// | Fresh water      |         80 |              0.010 |
/// | Marshy land      |         12 |              0.007 |
/// | Farmland, forest |         15 |              0.005 |
/// | Average ground   |         15 |              0.005 |
/// | Mountain, sand   |         13 |              0.002 |
/// | City             |          5 |              0.001 |
/// | Poor ground      |          4 |              0.001 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundType {
    SaltWater,
    GoodGround,
    FreshWater,
    MarshyLand,
    Farmland,
    AverageGround,
    Mountain,
    #[default]
    City,
    PoorGround,
}

impl GroundType {
    /// Returns `(relative permittivity, conductivity in S/m)`.
    pub fn constants(self) -> (f64, f64) {
        match self {
            Self::SaltWater => (80.0, 5.0),
            Self::GoodGround => (25.0, 0.02),
            Self::FreshWater => (80.0, 0.01),
            Self::MarshyLand => (12.0, 0.007),
            Self::Farmland => (15.0, 0.005),
            Self::AverageGround => (15.0, 0.005),
            Self::Mountain => (13.0, 0.002),
            Self::City => (5.0, 0.001),
            Self::PoorGround => (4.0, 0.001),
        }
    }
}

impl FromStr for GroundType {
    type Err = SplatError;

    fn from_str(s: &str) -> Result<Self, SplatError> {
        let ground = match s.replace('-', "_").as_str() {
            "salt_water" => Self::SaltWater,
            "good_ground" => Self::GoodGround,
            "fresh_water" => Self::FreshWater,
            "marshy_land" => Self::MarshyLand,
            "farmland" => Self::Farmland,
            "average_ground" => Self::AverageGround,
            "mountain" => Self::Mountain,
            "city" => Self::City,
            "poor_ground" => Self::PoorGround,
            _ => {
                return Err(SplatError::Param {
                    field: "ground",
                    reason: format!("unknown ground type {s:?}"),
                })
            }
        };
        Ok(ground)
    }
}

/// Everything needed to describe one simulated radio link.
///
/// Longitudes are east-positive degrees. Conversion to the tool's
/// west-positive convention happens in [`SiteRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub tx_lat: f64,
    pub tx_lon: f64,
    /// Transmitter antenna height above ground (meters).
    pub tx_height: u32,

    pub rx_lat: f64,
    pub rx_lon: f64,
    /// Receiver antenna height above ground (meters).
    pub rx_height: u32,

    /// Effective radiated power (Watts).
    #[serde(alias = "power")]
    pub erp: f64,

    /// Carrier frequency (MHz).
    pub frequency: f64,

    #[serde(alias = "polarization_type")]
    pub polarization: Polarization,

    /// Fraction of locations (0.0 to 1.0).
    #[serde(alias = "situations_fraction")]
    pub location_fraction: f64,

    /// Fraction of time (0.0 to 1.0).
    pub time_fraction: f64,

    #[serde(alias = "radioclimate")]
    pub radio_climate: Climate,

    /// Atmospheric bending constant (N-units).
    #[serde(alias = "atmospheric_bending_constant")]
    pub refractivity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earth_dielectric_constant: Option<f64>,

    /// Ground conductivity (Siemens/meter).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earth_conductivity: Option<f64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            tx_lat: 59.973858,
            tx_lon: 30.316145,
            tx_height: 50,
            rx_lat: 59.902639,
            rx_lon: 30.479671,
            rx_height: 50,
            erp: 10.0,
            frequency: 2400.0,
            polarization: Polarization::Horizontal,
            location_fraction: 0.5,
            time_fraction: 0.5,
            radio_climate: Climate::ContinentalTemperate,
            refractivity: 300.0,
            earth_dielectric_constant: None,
            earth_conductivity: None,
        }
    }
}

/// Frequency range accepted by the tool (MHz).
const FREQ_RANGE_MHZ: RangeInclusive<f64> = 20.0..=20_000.0;

impl SimulationParameters {
    /// Replaces the ground constants with those of `ground`.
    #[must_use]
    pub fn with_ground(mut self, ground: GroundType) -> Self {
        let (dielectric, conductivity) = ground.constants();
        self.earth_dielectric_constant = Some(dielectric);
        self.earth_conductivity = Some(conductivity);
        self
    }

    /// Returns `(dielectric, conductivity)`, falling back to
    /// [`GroundType::City`] for any constant left unset.
    pub fn ground(&self) -> (f64, f64) {
        let (dielectric, conductivity) = GroundType::default().constants();
        (
            self.earth_dielectric_constant.unwrap_or(dielectric),
            self.earth_conductivity.unwrap_or(conductivity),
        )
    }

    pub fn validate(&self) -> Result<(), SplatError> {
        check("tx_lat", self.tx_lat, -90.0..=90.0)?;
        check("tx_lon", self.tx_lon, -180.0..360.0)?;
        check("rx_lat", self.rx_lat, -90.0..=90.0)?;
        check("rx_lon", self.rx_lon, -180.0..360.0)?;
        check("erp", self.erp, 0.0..=f64::MAX)?;
        check("frequency", self.frequency, FREQ_RANGE_MHZ)?;
        check("location_fraction", self.location_fraction, 0.0..=1.0)?;
        check("time_fraction", self.time_fraction, 0.0..=1.0)?;
        check("refractivity", self.refractivity, f64::MIN_POSITIVE..=f64::MAX)?;
        if let Some(dielectric) = self.earth_dielectric_constant {
            check("earth_dielectric_constant", dielectric, f64::MIN_POSITIVE..=f64::MAX)?;
        }
        if let Some(conductivity) = self.earth_conductivity {
            check("earth_conductivity", conductivity, f64::MIN_POSITIVE..=f64::MAX)?;
        }
        Ok(())
    }

    pub fn tx_site(&self) -> SiteRecord {
        SiteRecord::new(TX_NAME, self.tx_lat, self.tx_lon, self.tx_height)
    }

    pub fn rx_site(&self) -> SiteRecord {
        SiteRecord::new(RX_NAME, self.rx_lat, self.rx_lon, self.rx_height)
    }

    /// Returns the environment record, with or without the trailing
    /// ERP line.
    pub fn environment(&self, with_erp: bool) -> EnvironmentRecord {
        let (dielectric, conductivity) = self.ground();
        EnvironmentRecord {
            dielectric,
            conductivity,
            refractivity: self.refractivity,
            frequency_mhz: self.frequency,
            climate: self.radio_climate,
            polarization: self.polarization,
            location_fraction: self.location_fraction,
            time_fraction: self.time_fraction,
            erp_w: with_erp.then_some(self.erp),
        }
    }

    /// Great circle distance between transmitter and receiver (meters).
    pub fn link_distance_m(&self) -> f64 {
        let tx = point!(x: self.tx_lon, y: self.tx_lat);
        let rx = point!(x: self.rx_lon, y: self.rx_lat);
        tx.haversine_distance(&rx)
    }
}

impl fmt::Display for SimulationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx ({}, {}) @ {} m, rx ({}, {}) @ {} m, {} MHz, {} W",
            self.tx_lat,
            self.tx_lon,
            self.tx_height,
            self.rx_lat,
            self.rx_lon,
            self.rx_height,
            self.frequency,
            self.erp
        )
    }
}

fn check<R>(field: &'static str, value: f64, range: R) -> Result<(), SplatError>
where
    R: RangeBounds<f64> + fmt::Debug,
{
    if !value.is_finite() {
        return Err(SplatError::Param {
            field,
            reason: format!("{value} is not a finite number"),
        });
    }
    if !range.contains(&value) {
        return Err(SplatError::Param {
            field,
            reason: format!("{value} is outside {range:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Climate, GroundType, Polarization, SimulationParameters};
    use crate::SplatError;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_default_is_valid() {
        SimulationParameters::default().validate().unwrap();
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let json = r#"{
            "tx_lat": 59.973858, "tx_lon": 30.316145, "tx_height": 50,
            "rx_lat": 59.902639, "rx_lon": 30.479671, "rx_height": 20,
            "power": 25.0, "frequency": 900,
            "polarization": "vertical",
            "situations_fraction": 0.9, "time_fraction": 0.5,
            "radioclimate": 4, "atmospheric_bending_constant": 301.0
        }"#;
        let params: SimulationParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.erp, 25.0);
        assert_eq!(params.frequency, 900.0);
        assert_eq!(params.polarization, Polarization::Vertical);
        assert_eq!(params.location_fraction, 0.9);
        assert_eq!(params.radio_climate, Climate::Desert);
        assert_eq!(params.refractivity, 301.0);
        assert_eq!(params.earth_dielectric_constant, None);
    }

    #[test]
    fn test_accepts_form_encoded_codes() {
        let mut value = serde_json::to_value(SimulationParameters::default()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("polarization");
        object.remove("radio_climate");
        object.insert("polarization_type".into(), "1".into());
        object.insert("radioclimate".into(), "6".into());
        let params: SimulationParameters = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(params.polarization, Polarization::Vertical);
        assert_eq!(params.radio_climate, Climate::MaritimeTemperateOverLand);

        value["polarization_type"] = false.into();
        value["radioclimate"] = " 2 ".into();
        let params: SimulationParameters = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(params.polarization, Polarization::Horizontal);
        assert_eq!(params.radio_climate, Climate::ContinentalSubtropical);

        value["radioclimate"] = "temperate".into();
        assert!(serde_json::from_value::<SimulationParameters>(value).is_err());
    }

    #[test]
    fn test_longitude_upper_bound_is_exclusive() {
        let params = SimulationParameters {
            tx_lon: 359.999,
            ..SimulationParameters::default()
        };
        params.validate().unwrap();

        let params = SimulationParameters {
            tx_lon: 360.0,
            ..SimulationParameters::default()
        };
        match params.validate() {
            Err(SplatError::Param { field, .. }) => assert_eq!(field, "tx_lon"),
            other => panic!("expected tx_lon error, got {other:?}"),
        }
        let params = SimulationParameters {
            rx_lon: -180.0,
            ..SimulationParameters::default()
        };
        params.validate().unwrap();
    }

    #[test]
    fn test_rejects_unknown_climate() {
        let mut value = serde_json::to_value(SimulationParameters::default()).unwrap();
        value["radio_climate"] = 9.into();
        assert!(serde_json::from_value::<SimulationParameters>(value).is_err());
    }

    #[test]
    fn test_rejects_negative_height() {
        let mut value = serde_json::to_value(SimulationParameters::default()).unwrap();
        value["rx_height"] = (-3).into();
        assert!(serde_json::from_value::<SimulationParameters>(value).is_err());
    }

    #[test]
    fn test_validate_fractions() {
        let params = SimulationParameters {
            time_fraction: 1.5,
            ..SimulationParameters::default()
        };
        match params.validate() {
            Err(SplatError::Param { field, .. }) => assert_eq!(field, "time_fraction"),
            other => panic!("expected time_fraction error, got {other:?}"),
        }

        let params = SimulationParameters {
            location_fraction: f64::NAN,
            ..SimulationParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_ground_fallback() {
        let params = SimulationParameters::default();
        assert_eq!(params.ground(), (5.0, 0.001));

        let params = params.with_ground(GroundType::SaltWater);
        assert_eq!(params.ground(), (80.0, 5.0));
        assert_eq!("salt-water".parse::<GroundType>().unwrap(), GroundType::SaltWater);
    }

    #[test]
    fn test_link_distance() {
        let distance_km = SimulationParameters::default().link_distance_m() / 1000.0;
        assert_approx_eq!(distance_km, 12.07, 0.2);
    }
}
