//! Request-environment lookups used when rebasing local resources.
//!
//! Rebasing turns short resource names into absolute application paths, which only
//! makes sense relative to the request currently being served. The lookup is an
//! explicit trait dependency injected into the rebase transform, so the
//! fatal-when-absent behaviour can be exercised directly in tests.

use crate::error::TransformError;

/// Access to the application root of the request currently being served.
pub trait RequestEnvironment: Send + Sync {
    /// The application root for the active request, or `None` when no request is in
    /// flight (for example on a background worker).
    fn application_root(&self) -> Option<String>;
}

/// Environment pinned to a fixed application root.
///
/// Suitable for applications that always serve from a known mount point, and for
/// exercising rebase behaviour without a live request.
#[derive(Debug, Clone)]
pub struct FixedRoot {
    root: String,
}

impl FixedRoot {
    /// Create an environment that always reports `root` as the application root.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl RequestEnvironment for FixedRoot {
    fn application_root(&self) -> Option<String> {
        Some(self.root.clone())
    }
}

/// Resolve an application-relative virtual path against the application root.
///
/// `~/`-prefixed paths are joined onto the root (`~/x` with root `/app` becomes
/// `/app/x`; with root `/` it becomes `/x`). Paths already starting with `/` are
/// returned unchanged. Anything else is not rooted and cannot be resolved.
pub fn to_application_absolute(
    virtual_path: &str,
    application_root: &str,
) -> Result<String, TransformError> {
    if let Some(rest) = virtual_path.strip_prefix("~/") {
        let root = application_root.trim_end_matches('/');
        return Ok(format!("{root}/{rest}"));
    }

    if virtual_path.starts_with('/') {
        return Ok(virtual_path.to_string());
    }

    Err(TransformError::UnrootedVirtualPath {
        path: virtual_path.to_string(),
    })
}
