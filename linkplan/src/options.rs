use anyhow::{anyhow, Error as AnyError};
use clap::{Args, Parser, Subcommand};
use geo::geometry::Coord;
use splat::{ArtifactKind, ElevationData, GroundType, ParamStore, Resolution, Splat, SplatError};
use std::{path::PathBuf, str::FromStr};

/// Configure, run, and collect SPLAT! link simulations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub env: Env,

    #[command(subcommand)]
    pub cmd: Command,
}

/// Where the tool, its inputs, and its outputs live.
#[derive(Debug, Clone, Args)]
pub struct Env {
    /// Standard resolution SPLAT! executable.
    #[arg(long = "splat", default_value = "third_party/splat/splat")]
    pub splat_bin: PathBuf,

    /// High resolution SPLAT! executable.
    #[arg(long = "splat-hd", default_value = "third_party/splat/splat-hd")]
    pub splat_hd_bin: PathBuf,

    /// Use the high resolution executable.
    #[arg(long, default_value_t = false)]
    pub hd: bool,

    /// Directory records are staged in and artifacts written to.
    #[arg(short, long, default_value = "third_party/splat")]
    pub work_dir: PathBuf,

    /// Directory of SPLAT! elevation (.sdf) tiles.
    #[arg(short, long, default_value = "third_party/splat/sdf")]
    pub sdf_dir: PathBuf,
}

impl Env {
    pub fn store(&self) -> ParamStore {
        ParamStore::new(&self.work_dir)
    }

    pub fn elevation(&self) -> ElevationData {
        ElevationData::new(&self.sdf_dir)
    }

    pub fn splat(&self) -> Result<Splat, SplatError> {
        let resolution = if self.hd {
            Resolution::High
        } else {
            Resolution::Standard
        };
        Splat::builder()
            .standard(&self.splat_bin)
            .high_res(&self.splat_hd_bin)
            .resolution(resolution)
            .work_dir(&self.work_dir)
            .sdf_dir(&self.sdf_dir)
            .build()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit simulation parameters.
    Configure(Configure),

    /// Print the current simulation parameters as JSON.
    Show,

    /// Replace the elevation tile set.
    Upload(Upload),

    /// Produce every artifact from the current parameters.
    Run(Run),

    /// Produce a single artifact from the current parameters.
    Artifact(Artifact),

    /// Report which SPLAT! executables can be started.
    Check,
}

#[derive(Debug, Clone, Args)]
pub struct Configure {
    /// JSON parameter record, or "-" for stdin. Starts from the
    /// current parameters when omitted.
    pub input: Option<PathBuf>,

    /// Transmitter "lat,lon,height", where 'height' is meters above
    /// ground.
    #[arg(long)]
    pub tx: Option<Site>,

    /// Receiver "lat,lon,height", where 'height' is meters above
    /// ground.
    #[arg(long)]
    pub rx: Option<Site>,

    /// Ground preset (salt-water, good-ground, fresh-water,
    /// marshy-land, farmland, average-ground, mountain, city,
    /// poor-ground).
    #[arg(long)]
    pub ground: Option<GroundType>,

    /// Effective radiated power (W).
    #[arg(long)]
    pub erp: Option<f64>,

    /// Signal frequency (MHz).
    #[arg(short, long)]
    pub frequency: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct Upload {
    /// Elevation tiles; any existing tiles are removed.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct Run {
    /// Print a JSON summary instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct Artifact {
    /// kml, terrain-profile, elevation-profile, height-profile,
    /// normalized-height-profile, path-loss-profile, coverage-map,
    /// loss-map, or field-map.
    pub kind: ArtifactKind,
}

#[derive(Clone, Debug, Copy)]
pub struct Site(pub Coord<f64>, pub u32);

impl FromStr for Site {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str, height_str) = {
            let idx = s
                .find(',')
                .ok_or_else(|| anyhow!("not a valid lat,lon,height"))?;
            let (lat_str, lon_height_str) = s.split_at(idx);
            let idx = lon_height_str[1..]
                .find(',')
                .ok_or_else(|| anyhow!("not a valid lat,lon,height"))?;
            let (lon_str, height_str) = lon_height_str[1..].split_at(idx);
            (lat_str, lon_str, &height_str[1..])
        };
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        let height = u32::from_str(height_str.trim())?;
        Ok(Self(Coord { y: lat, x: lon }, height))
    }
}
