//! `confctl set` — set a configure item's value

use serde_json::Value;

use conf_core::ConfigEngine;

use crate::cli::TargetArgs;
use crate::error::Result;

use super::scope_for;

pub fn run_set(
    engine: &ConfigEngine,
    target: &TargetArgs,
    key: &str,
    value: &str,
) -> Result<()> {
    let scope = scope_for(target)?;
    // the current value's type guides how the terminal string is read
    let current = engine.get(&scope, key)?;
    let value = parse_value_like(&current.value, value);
    engine.set(&scope, key, value)?;
    Ok(())
}

/// Interpret a terminal string in the shape of the value it replaces.
///
/// Booleans and numbers are parsed directly; anything else is read as
/// JSON, falling back to a plain string when it is not valid JSON.
fn parse_value_like(current: &Value, input: &str) -> Value {
    match current {
        Value::Bool(_) => match input {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => fallback(input),
        },
        Value::Number(_) => {
            if let Ok(n) = input.parse::<i64>() {
                Value::from(n)
            } else if let Ok(n) = input.parse::<f64>() {
                Value::from(n)
            } else {
                fallback(input)
            }
        }
        _ => fallback(input),
    }
}

fn fallback(input: &str) -> Value {
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}
