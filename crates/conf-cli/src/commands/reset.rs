//! `confctl reset` — revert configure items to their defaults

use conf_core::ConfigEngine;

use crate::cli::TargetArgs;
use crate::error::Result;

use super::scope_for;

pub fn run_reset(engine: &ConfigEngine, target: &TargetArgs, key: Option<&str>) -> Result<()> {
    let scope = scope_for(target)?;
    let changed = engine.reset(&scope, key)?;
    tracing::debug!(%scope, ?changed, "reset done");
    Ok(())
}
