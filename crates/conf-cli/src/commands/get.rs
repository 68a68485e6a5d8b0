//! `confctl get` — key list, value, or key metadata

use conf_core::{ConfigEngine, MetaField};

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};

use super::scope_for;

pub fn run_get(
    engine: &ConfigEngine,
    target: &TargetArgs,
    key: Option<&str>,
    method: &str,
) -> Result<()> {
    let scope = scope_for(target)?;

    let Some(key) = key else {
        for key in engine.keys(&scope)? {
            println!("{key}");
        }
        return Ok(());
    };

    if method == "value" {
        let resolved = engine.get(&scope, key)?;
        // JSON rendering: bare booleans and numbers, quoted strings
        println!("{}", serde_json::to_string(&resolved.value)?);
        return Ok(());
    }

    let field = MetaField::parse(method).ok_or_else(|| {
        CliError::user(format!(
            "no method [{method}] for `get` command; methods: {}",
            MetaField::names().join(", ")
        ))
    })?;
    println!("{}", engine.get_meta(&scope, key, field)?);
    Ok(())
}
