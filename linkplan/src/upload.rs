use crate::options::{Env, Upload};
use anyhow::{anyhow, Context, Result};
use std::{ffi::OsStr, fs};

impl Upload {
    pub fn run(&self, env: &Env) -> Result<()> {
        let files = self
            .files
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .and_then(OsStr::to_str)
                    .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?
                    .to_owned();
                let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                Ok((name, bytes))
            })
            .collect::<Result<Vec<_>>>()?;
        let elevation = env.elevation();
        let count = elevation.replace(files)?;
        println!("{count} files written to {}", elevation.dir().display());
        Ok(())
    }
}
