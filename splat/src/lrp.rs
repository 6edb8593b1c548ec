//! Environment (`.lrp`) record format.
//!
//! One value per line, each followed by a `;` comment. Field order is
//! fixed: ground dielectric, ground conductivity, atmospheric bending
//! constant, frequency, radio climate, polarization, location fraction,
//! time fraction, and, optionally, ERP.

use crate::{
    error::SplatError,
    params::{Climate, Polarization},
};
use std::{fmt, fs, path::Path, str::FromStr};

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentRecord {
    /// Relative permittivity of the ground.
    pub dielectric: f64,
    /// Ground conductivity (Siemens/meter).
    pub conductivity: f64,
    /// Atmospheric bending constant (N-units).
    pub refractivity: f64,
    pub frequency_mhz: f64,
    pub climate: Climate,
    pub polarization: Polarization,
    pub location_fraction: f64,
    pub time_fraction: f64,
    /// Effective radiated power (Watts).
    ///
    /// When present the tool reports field strength or signal level
    /// instead of path loss.
    pub erp_w: Option<f64>,
}

impl EnvironmentRecord {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SplatError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SplatError> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl fmt::Display for EnvironmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ; Earth Dielectric Constant (Relative permittivity)",
            self.dielectric
        )?;
        writeln!(
            f,
            "{} ; Earth Conductivity (Siemens per meter)",
            self.conductivity
        )?;
        writeln!(
            f,
            "{} ; Atmospheric Bending Constant (N-Units)",
            self.refractivity
        )?;
        writeln!(
            f,
            "{} ; Frequency in MHz (20 MHz to 20 GHz)",
            self.frequency_mhz
        )?;
        writeln!(
            f,
            "{} ; Radio Climate ({})",
            self.climate as u8,
            self.climate.description()
        )?;
        writeln!(
            f,
            "{} ; Polarization (0 = Horizontal, 1 = Vertical)",
            self.polarization as u8
        )?;
        writeln!(f, "{} ; Fraction of situations", self.location_fraction)?;
        writeln!(f, "{} ; Fraction of time", self.time_fraction)?;
        if let Some(erp_w) = self.erp_w {
            writeln!(f, "{erp_w} ; Effective Radiated Power (Watts)")?;
        }
        Ok(())
    }
}

impl FromStr for EnvironmentRecord {
    type Err = SplatError;

    fn from_str(s: &str) -> Result<Self, SplatError> {
        let mut values = s
            .lines()
            .map(|line| line.split(';').next().unwrap_or_default().trim())
            .filter(|value| !value.is_empty());
        let mut next = |what: &'static str| {
            let value = values
                .next()
                .ok_or_else(|| malformed(format!("missing {what}")))?;
            parse_value(what, value)
        };

        let dielectric = next("dielectric constant")?;
        let conductivity = next("conductivity")?;
        let refractivity = next("bending constant")?;
        let frequency_mhz = next("frequency")?;
        let climate = {
            let code = next("radio climate")?;
            integer_code(code)
                .and_then(|code| Climate::try_from(code).ok())
                .ok_or_else(|| malformed(format!("invalid radio climate {code}")))?
        };
        let polarization = {
            let code = next("polarization")?;
            integer_code(code)
                .and_then(Polarization::from_code)
                .ok_or_else(|| malformed(format!("invalid polarization {code}")))?
        };
        let location_fraction = next("location fraction")?;
        let time_fraction = next("time fraction")?;
        // The ERP line is optional.
        let erp_w = values
            .next()
            .map(|value| parse_value("erp", value))
            .transpose()?;

        Ok(Self {
            dielectric,
            conductivity,
            refractivity,
            frequency_mhz,
            climate,
            polarization,
            location_fraction,
            time_fraction,
            erp_w,
        })
    }
}

fn parse_value(what: &str, value: &str) -> Result<f64, SplatError> {
    value
        .parse::<f64>()
        .map_err(|_| malformed(format!("invalid {what} {value:?}")))
}

fn integer_code(value: f64) -> Option<u8> {
    (value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value)).then_some(value as u8)
}

fn malformed(reason: String) -> SplatError {
    SplatError::Record {
        file: "lrp".into(),
        reason,
    }
}
