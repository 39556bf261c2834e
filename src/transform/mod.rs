//! The transform chain applied to registered resources before markup is emitted.
//!
//! Each transform consumes the ordered resource list produced by its predecessor and
//! either rewrites individual references or reshapes the whole list. The submodules
//! keep each rewrite rule small enough to be tested on its own; the shared
//! kind/scope filtering lives in [`TransformFilter`].

mod concat;
mod extension;
mod filter;
mod overrides;
mod rebase;
mod unique;
mod version;

pub use concat::ConcatenationTransform;
pub use extension::ExtensionTransform;
pub use filter::TransformFilter;
pub use overrides::PathOverrideTransform;
pub use rebase::LocalRebaseTransform;
pub use unique::UniqueTransform;
pub use version::VersionTransform;

use std::collections::BTreeSet;

use crate::error::TransformError;
use crate::model::ResourceKind;

/// A single stage in the resource pipeline.
///
/// Implementations never mutate the input slice and preserve the relative order of
/// items they leave untouched. The rewrite must depend only on the reference itself
/// and the transform's own configuration; the two list-level transforms
/// ([`UniqueTransform`] and [`ConcatenationTransform`]) additionally consider the
/// whole list in order to remove duplicates.
pub trait ResourceTransform: Send + Sync {
    /// Rewrite, filter, or reorder `resources` for the given `kind`.
    ///
    /// Returns the transformed list, or the first error raised by a rewrite rule.
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError>;
}

/// Remove duplicate entries while keeping the first occurrence of each value in place.
pub(crate) fn dedup_stable(values: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
