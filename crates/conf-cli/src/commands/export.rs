//! `confctl export` — effective configuration as CSV rows

use conf_core::{ConfigEngine, ListFilter};

use crate::cli::TargetArgs;
use crate::error::Result;

use super::current_uid;

pub fn run_export(engine: &ConfigEngine, target: &TargetArgs) -> Result<()> {
    let uid = target.uid.unwrap_or_else(current_uid);
    let filter = ListFilter {
        appid: target.appid.clone(),
        resource: target.resource.clone(),
        subpath: (!target.subpath.is_empty()).then(|| target.subpath.clone()),
    };

    println!("appid,resource,subpath,key,value,is_default");
    for row in engine.export_rows(uid, &filter)? {
        println!(
            "{},{},{},{},{},{}",
            csv_field(&row.appid),
            csv_field(&row.resource),
            csv_field(&row.subpath),
            csv_field(&row.key),
            csv_field(&serde_json::to_string(&row.value)?),
            row.is_default
        );
    }
    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
