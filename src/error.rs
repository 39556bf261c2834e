//! Failures surfaced while configuring transforms and processing resource lists.

use thiserror::Error;

/// Errors produced by transform configuration and by pipeline runs.
///
/// Configuration mistakes (duplicate registrations, bad rebase templates) surface when
/// the transform is built, not when the first page renders. Processing errors abort the
/// whole pipeline call for that kind; nothing downstream runs on a partial result.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A resource was registered twice in a path-override table.
    #[error("resource `{resource}` is already overridden by `{existing}`")]
    DuplicateOverride {
        /// Resource that was registered a second time.
        resource: String,
        /// Replacement already recorded for it.
        existing: String,
    },

    /// A resource was assigned to more than one concatenation group.
    #[error("resource `{resource}` already belongs to group `{existing}`")]
    DuplicateGroup {
        /// Resource that was assigned a second time.
        resource: String,
        /// Group it already belongs to.
        existing: String,
    },

    /// A rebase template was rejected at construction time.
    #[error("rebase template `{template}` must start with `~/` or `/` and contain `{{}}`")]
    InvalidRebaseTemplate {
        /// The rejected template.
        template: String,
    },

    /// Local resources cannot be rebased without an active request.
    #[error("cannot rebase local resources without an active request context")]
    MissingRequestContext,

    /// A virtual path could not be resolved against the application root.
    #[error("virtual path `{path}` must start with `~/` or `/`")]
    UnrootedVirtualPath {
        /// The path that could not be resolved.
        path: String,
    },
}
