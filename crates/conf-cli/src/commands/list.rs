//! `confctl list` — discovery of appids, resources and subpaths

use regex::Regex;

use conf_core::ConfigEngine;

use crate::error::{CliError, Result};

pub fn run_list(
    engine: &ConfigEngine,
    appid: Option<String>,
    resource: Option<String>,
) -> Result<()> {
    let registry = engine.registry();

    match (appid, resource) {
        // appid + resource: the resource's subpath installs
        (Some(appid), Some(resource)) => {
            if !registry.resource_exists(&appid, &resource) {
                return Err(CliError::user(format!(
                    "not exist resource:[{resource}] for the appid:[{appid}]"
                )));
            }
            for subpath in registry.subpaths_for_resource(&appid, &resource) {
                println!("{subpath}");
            }
        }
        // appid only: its resources
        (Some(appid), None) => {
            let resources = registry.resources_for_app(&appid);
            if resources.is_empty() && !registry.applications().contains(&appid) {
                return Err(CliError::user(format!("not exist appid:{appid}")));
            }
            for resource in resources {
                println!("{resource}");
            }
        }
        // resource pattern only: matching resources across every app
        (None, Some(pattern)) => {
            let re = Regex::new(&pattern)
                .map_err(|e| CliError::user(format!("invalid resource pattern: {e}")))?;
            let mut matches = Vec::new();
            for appid in registry.applications() {
                for resource in registry.resources_for_app(&appid) {
                    if re.is_match(&resource) {
                        matches.push(resource);
                    }
                }
            }
            matches.sort();
            matches.dedup();
            for resource in matches {
                println!("{resource}");
            }
        }
        // nothing: every installed application
        (None, None) => {
            for appid in registry.applications() {
                println!("{appid}");
            }
        }
    }
    Ok(())
}
