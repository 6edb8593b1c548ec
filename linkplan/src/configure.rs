use crate::options::{Configure, Env, Site};
use anyhow::{Context, Result};
use log::info;
use splat::SimulationParameters;
use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};

impl Configure {
    pub fn run(&self, env: &Env) -> Result<()> {
        let store = env.store();
        let mut params: SimulationParameters = match &self.input {
            None => store.current()?,
            Some(path) if path == Path::new("-") => {
                serde_json::from_reader(io::stdin().lock()).context("parsing stdin")?
            }
            Some(path) => {
                let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing {}", path.display()))?
            }
        };
        self.apply(&mut params);
        store.submit(&params)?;
        info!("submitted {params}");
        println!("{}", serde_json::to_string_pretty(&params)?);
        Ok(())
    }

    fn apply(&self, params: &mut SimulationParameters) {
        if let Some(Site(coord, height)) = self.tx {
            params.tx_lat = coord.y;
            params.tx_lon = coord.x;
            params.tx_height = height;
        }
        if let Some(Site(coord, height)) = self.rx {
            params.rx_lat = coord.y;
            params.rx_lon = coord.x;
            params.rx_height = height;
        }
        if let Some(ground) = self.ground {
            *params = params.clone().with_ground(ground);
        }
        if let Some(erp) = self.erp {
            params.erp = erp;
        }
        if let Some(frequency) = self.frequency {
            params.frequency = frequency;
        }
    }
}
