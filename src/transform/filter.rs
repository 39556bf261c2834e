use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};

/// Shared kind- and scope-filtering used by the per-item transforms.
///
/// A transform declares the kinds of resource list it participates in and the scopes
/// of individual references it rewrites. [`TransformFilter::apply`] enforces both:
/// lists of a foreign kind come back untouched, and references outside the declared
/// scope pass through while the rest are handed to the rewrite hook.
///
/// The hook may return `Ok(None)` to drop a reference from the list entirely. None of
/// the bundled transforms remove items this way, but custom transforms can use it to
/// filter.
#[derive(Debug, Clone, Copy)]
pub struct TransformFilter {
    kind: ResourceKind,
    scope: ResourceScope,
}

impl TransformFilter {
    /// Create a filter for the declared `kind` and `scope` pair.
    pub fn new(kind: ResourceKind, scope: ResourceScope) -> Self {
        Self { kind, scope }
    }

    /// The resource kinds this transform participates in.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The reference scopes this transform rewrites.
    pub fn scope(&self) -> ResourceScope {
        self.scope
    }

    /// Run `rewrite` over every in-scope reference in `resources`.
    ///
    /// When `kind` is not contained in the declared kind the input is returned
    /// unchanged. Otherwise each reference is classified with [`ResourceScope::of`];
    /// out-of-scope references are copied through as-is and in-scope ones are replaced
    /// by the hook's result, or dropped when the hook returns `Ok(None)`.
    pub fn apply<F>(
        &self,
        resources: &[String],
        kind: ResourceKind,
        mut rewrite: F,
    ) -> Result<Vec<String>, TransformError>
    where
        F: FnMut(&str) -> Result<Option<String>, TransformError>,
    {
        if !self.kind.contains(kind) {
            return Ok(resources.to_vec());
        }

        let mut result = Vec::with_capacity(resources.len());
        for resource in resources {
            if !self.scope.contains(ResourceScope::of(resource)) {
                result.push(resource.clone());
                continue;
            }

            if let Some(rewritten) = rewrite(resource)? {
                result.push(rewritten);
            }
        }

        Ok(result)
    }
}
