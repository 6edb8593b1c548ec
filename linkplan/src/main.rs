mod configure;
mod options;
mod run;
mod upload;

use anyhow::Result;
use clap::Parser;
use options::{Cli, Command, Env};
use splat::Resolution;

fn main() -> Result<()> {
    env_logger::init();
    let Cli { env, cmd } = Cli::parse();
    match cmd {
        Command::Configure(configure) => configure.run(&env),
        Command::Show => show(&env),
        Command::Upload(upload) => upload.run(&env),
        Command::Run(run) => run.run(&env),
        Command::Artifact(artifact) => artifact.run(&env),
        Command::Check => check(&env),
    }
}

fn show(env: &Env) -> Result<()> {
    let params = env.store().current()?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

fn check(env: &Env) -> Result<()> {
    let splat = env.splat()?;
    let resolution = match splat.resolution() {
        Resolution::Standard => "standard",
        Resolution::High => "high",
    };
    println!("executable: {}", splat.executable().display());
    println!("resolution: {resolution}");
    println!("work dir:   {}", splat.work_dir().display());
    println!("sdf tiles:  {}", splat.elevation().tile_count()?);
    Ok(())
}
