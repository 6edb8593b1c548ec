use crate::{error::SplatError, params::SimulationParameters};
use log::debug;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Single-slot store for the last submitted [`SimulationParameters`].
///
/// Last write wins. A run should read the slot once and work from that
/// snapshot; a submission landing mid-run only affects the next run.
/// Nothing serializes two runs sharing the same working directory.
#[derive(Debug, Clone)]
pub struct ParamStore {
    path: PathBuf,
}

impl ParamStore {
    pub const FILE_NAME: &'static str = "params.json";

    /// Returns a store kept in `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates and stores `params`, replacing what was there.
    pub fn submit(&self, params: &SimulationParameters) -> Result<(), SplatError> {
        params.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write then rename so a concurrent reader never sees a
        // partial record.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(params)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("submitted {params}");
        Ok(())
    }

    /// Returns the last submitted parameters, or the defaults if
    /// nothing was ever submitted.
    pub fn current(&self) -> Result<SimulationParameters, SplatError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SimulationParameters::default()),
            Err(e) => Err(e.into()),
        }
    }
}
