//! `confctl watch` — follow value changes for configure items

use conf_core::ConfigEngine;

use crate::cli::TargetArgs;
use crate::error::Result;

use super::scope_for;

pub fn run_watch(engine: &ConfigEngine, target: &TargetArgs, key: Option<&str>) -> Result<()> {
    let scope = scope_for(target)?;
    let mut subscription = engine.watch(&scope, key)?;
    tracing::debug!(%scope, filter = ?key, "watching");

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async move {
        // runs until interrupted; the engine outlives the loop, so recv
        // only returns None on teardown
        while let Some(event) = subscription.recv().await {
            println!("{}", event.key);
        }
    });
    Ok(())
}
