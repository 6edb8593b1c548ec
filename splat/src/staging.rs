//! Writes the input records the tool reads from its working directory.

use crate::{error::SplatError, params::SimulationParameters};
use log::debug;
use std::path::Path;

/// Transmitter site record.
pub const TX_FILE: &str = "tx.qth";

/// Receiver site record.
pub const RX_FILE: &str = "rx.qth";

/// The tool falls back to this environment record when no
/// `<tx site>.lrp` exists.
pub const LRP_FILE: &str = "splat.lrp";

/// Writes both site records and the environment record (with ERP) to
/// `dir`, replacing any previous content.
pub fn stage(dir: &Path, params: &SimulationParameters) -> Result<(), SplatError> {
    let tx = dir.join(TX_FILE);
    params.tx_site().save(&tx)?;
    debug!("staged {}", tx.display());

    let rx = dir.join(RX_FILE);
    params.rx_site().save(&rx)?;
    debug!("staged {}", rx.display());

    stage_environment(dir, params, true)
}

/// Rewrites only the environment record.
pub fn stage_environment(
    dir: &Path,
    params: &SimulationParameters,
    with_erp: bool,
) -> Result<(), SplatError> {
    let lrp = dir.join(LRP_FILE);
    params.environment(with_erp).save(&lrp)?;
    debug!("staged {} (erp: {with_erp})", lrp.display());
    Ok(())
}
