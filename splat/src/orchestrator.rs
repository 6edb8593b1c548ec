use crate::{
    artifact::{ArtifactKind, ArtifactResult},
    elevation::ElevationData,
    error::SplatError,
    params::SimulationParameters,
    raster,
    report::RunReport,
    runner::{CommandRunner, Invocation, SystemRunner},
    staging::{self, RX_FILE, TX_FILE},
};
use log::{debug, info, warn};
use std::{
    ffi::{OsStr, OsString},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Which of the two tool builds to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// 3 arc-second terrain (`splat`).
    #[default]
    Standard,
    /// 1 arc-second terrain (`splat-hd`).
    High,
}

/// Drives the external SPLAT! executable.
///
/// All invocations run in `work_dir`, where the site and environment
/// records are staged and where the tool writes its output.
#[derive(Debug)]
pub struct Splat<R = SystemRunner> {
    standard: PathBuf,
    high_res: PathBuf,
    resolution: Resolution,
    work_dir: PathBuf,
    elevation: ElevationData,
    runner: R,
}

impl Splat {
    pub fn builder() -> SplatBuilder {
        SplatBuilder {
            standard: None,
            high_res: None,
            resolution: Resolution::Standard,
            work_dir: None,
            sdf_dir: None,
        }
    }
}

pub struct SplatBuilder {
    /// Standard resolution executable (required).
    standard: Option<PathBuf>,

    /// High resolution executable (required).
    high_res: Option<PathBuf>,

    /// Preferred executable (defaults to standard).
    resolution: Resolution,

    /// Directory records are staged in and outputs written to
    /// (required).
    work_dir: Option<PathBuf>,

    /// Directory of `.sdf` elevation tiles (required).
    sdf_dir: Option<PathBuf>,
}

impl SplatBuilder {
    /// Standard resolution executable (required).
    #[must_use]
    pub fn standard<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.standard = Some(path.into());
        self
    }

    /// High resolution executable (required).
    #[must_use]
    pub fn high_res<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.high_res = Some(path.into());
        self
    }

    /// Preferred executable (defaults to standard).
    #[must_use]
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Working directory (required, created if missing).
    #[must_use]
    pub fn work_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.work_dir = Some(path.into());
        self
    }

    /// Elevation tile directory (required, created if missing).
    #[must_use]
    pub fn sdf_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.sdf_dir = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Splat, SplatError> {
        self.build_with_runner(SystemRunner)
    }

    /// Builds an orchestrator that launches processes through
    /// `runner`.
    ///
    /// Both executables are probed by starting them without
    /// arguments. Only whether the process could be started matters,
    /// not its exit code, which differs between tool versions.
    pub fn build_with_runner<R: CommandRunner>(self, runner: R) -> Result<Splat<R>, SplatError> {
        let standard = self.standard.ok_or(SplatError::Builder("standard"))?;
        let high_res = self.high_res.ok_or(SplatError::Builder("high_res"))?;
        let work_dir = self.work_dir.ok_or(SplatError::Builder("work_dir"))?;
        let sdf_dir = self.sdf_dir.ok_or(SplatError::Builder("sdf_dir"))?;

        fs::create_dir_all(&work_dir)?;
        fs::create_dir_all(&sdf_dir)?;
        let work_dir = fs::canonicalize(work_dir)?;
        let sdf_dir = fs::canonicalize(sdf_dir)?;
        // Relative program paths are ambiguous once the child's
        // working directory changes.
        let standard = fs::canonicalize(&standard).unwrap_or(standard);
        let high_res = fs::canonicalize(&high_res).unwrap_or(high_res);

        let resolution = match (
            self.resolution,
            probe(&runner, &standard, &work_dir),
            probe(&runner, &high_res, &work_dir),
        ) {
            (_, false, false) => {
                return Err(SplatError::ExecutableNotFound { standard, high_res });
            }
            (Resolution::Standard, false, true) => {
                warn!("{} unusable, falling back to {}", standard.display(), high_res.display());
                Resolution::High
            }
            (Resolution::High, true, false) => {
                warn!("{} unusable, falling back to {}", high_res.display(), standard.display());
                Resolution::Standard
            }
            (resolution, _, _) => resolution,
        };

        let elevation = ElevationData::new(sdf_dir);
        if elevation.tile_count()? == 0 {
            warn!(
                "no .sdf files in {}, terrain will be treated as sea level",
                elevation.dir().display()
            );
        }

        Ok(Splat {
            standard,
            high_res,
            resolution,
            work_dir,
            elevation,
            runner,
        })
    }
}

impl<R: CommandRunner> Splat<R> {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Selects the executable used by subsequent invocations.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    /// The executable used for the next invocation.
    pub fn executable(&self) -> &Path {
        match self.resolution {
            Resolution::Standard => &self.standard,
            Resolution::High => &self.high_res,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn elevation(&self) -> &ElevationData {
        &self.elevation
    }

    /// Writes the site and environment records for `params`.
    pub fn stage(&self, params: &SimulationParameters) -> Result<(), SplatError> {
        staging::stage(&self.work_dir, params)
    }

    /// Invokes the active executable with the common flags followed by
    /// `args`.
    ///
    /// A non-zero exit is not an error; inspect the returned
    /// [`Invocation`].
    pub fn run<I, S>(&self, args: I) -> Result<Invocation, SplatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let exe = self.executable();
        if !exe.is_file() {
            return Err(SplatError::ExecutableMissing(exe.to_owned()));
        }
        let mut full_args: Vec<OsString> = vec![
            "-d".into(),
            self.elevation.dir().as_os_str().to_owned(),
            "-metric".into(),
        ];
        full_args.extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        debug!("running {} {:?}", exe.display(), full_args);

        self.runner
            .run(exe, &full_args, &self.work_dir)
            .map_err(|source| SplatError::Spawn {
                path: exe.to_owned(),
                source,
            })
    }

    /// Produces a single artifact from already staged site records.
    ///
    /// Stale output for `kind` is removed first. A non-zero exit yields
    /// a result without an output path. A zero exit that leaves no
    /// output behind is an error.
    pub fn produce(
        &self,
        kind: ArtifactKind,
        params: &SimulationParameters,
    ) -> Result<ArtifactResult, SplatError> {
        staging::stage_environment(&self.work_dir, params, kind.stages_erp())?;

        let raw = self.work_dir.join(kind.raw_file());
        let output = self.work_dir.join(kind.file_name());
        remove_stale(&raw)?;
        if output != raw {
            remove_stale(&output)?;
        }

        let mut args = vec![
            "-t".to_owned(),
            TX_FILE.to_owned(),
            "-r".to_owned(),
            RX_FILE.to_owned(),
        ];
        args.extend(kind.args(params));
        let invocation = self.run(&args)?;

        if !invocation.success() {
            warn!(
                "{kind} exited with {:?}: {}",
                invocation.exit_code,
                invocation.last_message().unwrap_or_default()
            );
            return Ok(ArtifactResult {
                kind,
                invocation,
                output: None,
            });
        }

        if !raw.is_file() {
            return Err(SplatError::MissingOutput { kind, path: raw });
        }
        let output = if kind.needs_conversion() {
            raster::convert_ppm(&raw)?
        } else {
            raw
        };
        info!("{kind}: {}", output.display());

        Ok(ArtifactResult {
            kind,
            invocation,
            output: Some(output),
        })
    }

    /// Stages `params` and produces every artifact in
    /// [`ArtifactKind::ALL`] order.
    ///
    /// Only a staging failure aborts the run. Each artifact's failure
    /// is recorded in the report and the run moves on.
    pub fn produce_all(&self, params: &SimulationParameters) -> Result<RunReport, SplatError> {
        self.stage(params)?;
        let mut report = RunReport::new(params.link_distance_m());
        for kind in ArtifactKind::ALL {
            let outcome = self.produce(kind, params);
            if let Err(e) = &outcome {
                warn!("{kind} failed: {e}");
            }
            report.push(kind, outcome);
        }
        Ok(report)
    }
}

/// Returns whether `path` exists and can be started.
fn probe<R: CommandRunner>(runner: &R, path: &Path, cwd: &Path) -> bool {
    if !path.is_file() {
        debug!("{} does not exist", path.display());
        return false;
    }
    match runner.run(path, &[], cwd) {
        Ok(invocation) => {
            debug!("probed {}: {:?}", path.display(), invocation.exit_code);
            true
        }
        Err(e) => {
            warn!("unable to start {}: {e}", path.display());
            false
        }
    }
}

fn remove_stale(path: &Path) -> Result<(), SplatError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
