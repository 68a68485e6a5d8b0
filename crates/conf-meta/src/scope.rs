//! The configuration namespace coordinate

use std::fmt;

use serde::{Deserialize, Serialize};

/// Directory name used for application-independent configuration
/// (an empty `appid`).
pub const GENERIC_APP_DIR: &str = "_generic";

/// Identifies one configuration namespace.
///
/// Every engine operation is parameterized by a scope. An empty `appid`
/// denotes application-independent configuration; `subpath` selects one of
/// several configuration description sets installed for the same
/// appid/resource pair (an empty subpath selects the base install).
/// Subpath installs are independent sets — they replace each other, they
/// are never merged.
///
/// # Example
///
/// ```
/// use conf_meta::Scope;
///
/// let scope = Scope::new(1000, "dconfig-example", "example", "");
/// assert_eq!(scope.to_string(), "1000:dconfig-example/example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    /// User the configuration belongs to
    pub uid: u32,
    /// Application id; empty for application-independent configuration
    pub appid: String,
    /// Configuration description (schema) name
    pub resource: String,
    /// Secondary install path; empty for the base install
    pub subpath: String,
}

impl Scope {
    /// Create a scope from its four coordinates.
    ///
    /// A leading `/` on `subpath` is stripped so that `"/a"` and `"a"`
    /// name the same install.
    pub fn new(
        uid: u32,
        appid: impl Into<String>,
        resource: impl Into<String>,
        subpath: impl Into<String>,
    ) -> Self {
        let subpath: String = subpath.into();
        Self {
            uid,
            appid: appid.into(),
            resource: resource.into(),
            subpath: subpath.trim_start_matches('/').to_string(),
        }
    }

    /// Directory name for this scope's application under an install root.
    ///
    /// Empty appids map to the [`GENERIC_APP_DIR`] directory.
    pub fn app_dir(&self) -> &str {
        if self.appid.is_empty() {
            GENERIC_APP_DIR
        } else {
            &self.appid
        }
    }

    /// Whether this scope names application-independent configuration.
    pub fn is_generic(&self) -> bool {
        self.appid.is_empty()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.uid, self.app_dir(), self.resource)?;
        if !self.subpath.is_empty() {
            write!(f, "/{}", self.subpath)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_slash_stripped() {
        let a = Scope::new(0, "app", "res", "/a");
        let b = Scope::new(0, "app", "res", "a");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generic_app_dir() {
        let scope = Scope::new(1000, "", "dde-dconfig", "");
        assert!(scope.is_generic());
        assert_eq!(scope.app_dir(), GENERIC_APP_DIR);
        assert_eq!(scope.to_string(), "1000:_generic/dde-dconfig");
    }

    #[test]
    fn test_display_with_subpath() {
        let scope = Scope::new(1000, "dconfig-example", "example", "a");
        assert_eq!(scope.to_string(), "1000:dconfig-example/example/a");
    }
}
