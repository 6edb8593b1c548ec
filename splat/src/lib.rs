//! # SPLAT! orchestration
//!
//! `splat` prepares inputs for, runs, and post-processes the output of
//! the [SPLAT!] RF signal propagation and terrain analysis tool. The
//! propagation model itself lives entirely in the external executable.
//!
//! A typical run:
//!
//! 1. [`ParamStore::submit`] the link's [`SimulationParameters`].
//! 1. [`ElevationData::replace`] the `.sdf` terrain tiles, if needed.
//! 1. [`Splat::produce_all`] with a snapshot from [`ParamStore::current`],
//!    which stages the site and environment records and invokes the tool
//!    once per [`ArtifactKind`].
//!
//! [SPLAT!]: https://www.qsl.net/kd2bd/splat.html

mod artifact;
mod elevation;
mod error;
pub mod lrp;
mod orchestrator;
mod params;
pub mod qth;
pub mod raster;
mod report;
pub mod runner;
pub mod staging;
mod store;

pub use crate::{
    artifact::{ArtifactKind, ArtifactResult},
    elevation::ElevationData,
    error::SplatError,
    orchestrator::{Resolution, Splat, SplatBuilder},
    params::{Climate, GroundType, Polarization, SimulationParameters},
    report::{ArtifactSummary, RunReport, Summary},
    runner::{CommandRunner, Invocation, SystemRunner},
    store::ParamStore,
};
