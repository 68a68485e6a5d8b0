//! Command implementations

mod export;
mod get;
mod list;
mod reset;
mod set;
mod watch;

pub use export::run_export;
pub use get::run_get;
pub use list::run_list;
pub use reset::run_reset;
pub use set::run_set;
pub use watch::run_watch;

use conf_meta::Scope;

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};

/// Uid of the invoking user.
pub(crate) fn current_uid() -> u32 {
    // SAFETY: getuid has no failure modes and touches no memory
    unsafe { libc::getuid() }
}

/// Build the operation scope from target arguments.
///
/// The resource defaults to the appid's value when unset; at least one of
/// the two must be given (an empty appid selects application-independent
/// configuration and needs an explicit resource).
pub(crate) fn scope_for(target: &TargetArgs) -> Result<Scope> {
    let appid = target.appid.clone().unwrap_or_default();
    let resource = match &target.resource {
        Some(resource) => resource.clone(),
        None => appid.clone(),
    };
    if resource.is_empty() {
        return Err(CliError::user("not set appid or resource."));
    }
    let uid = target.uid.unwrap_or_else(current_uid);
    Ok(Scope::new(uid, appid, resource, target.subpath.clone()))
}
