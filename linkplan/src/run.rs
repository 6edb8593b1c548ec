use crate::options::{Artifact, Env, Run};
use anyhow::{bail, Result};
use splat::RunReport;
use std::io::{self, Write};

impl Run {
    pub fn run(&self, env: &Env) -> Result<()> {
        // Later submissions do not affect a run in progress.
        let params = env.store().current()?;
        let splat = env.splat()?;
        let report = splat.produce_all(&params)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report.summary())?);
        } else {
            print_report(&report)?;
        }
        if report.all_failed() {
            bail!("no artifacts were produced");
        }
        Ok(())
    }
}

impl Artifact {
    pub fn run(&self, env: &Env) -> Result<()> {
        let params = env.store().current()?;
        let splat = env.splat()?;
        splat.stage(&params)?;
        let result = splat.produce(self.kind, &params)?;
        if let Some(reason) = result.failure() {
            bail!("{}: {reason}", self.kind);
        }
        if let Some(path) = result.output() {
            println!("{}", path.display());
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "distance: {:.3} km", report.distance_m() / 1000.0)?;
    for (kind, path) in report.succeeded() {
        writeln!(stdout, "{:<26} {path}", kind.name())?;
    }
    for (kind, reason) in report.failed() {
        writeln!(stdout, "{:<26} FAILED: {reason}", kind.name())?;
    }
    Ok(())
}
