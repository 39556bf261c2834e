use std::collections::BTreeMap;

use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};
use crate::transform::{ResourceTransform, TransformFilter};

/// Replaces individual references by exact match, for example to point a script name
/// at a CDN location.
pub struct PathOverrideTransform {
    filter: TransformFilter,
    overrides: BTreeMap<String, String>,
}

impl PathOverrideTransform {
    /// Create an override transform for the declared kind and scope.
    pub fn new(kind: ResourceKind, scope: ResourceScope) -> Self {
        Self {
            filter: TransformFilter::new(kind, scope),
            overrides: BTreeMap::new(),
        }
    }

    /// Map `original` to `replacement`.
    ///
    /// Each original location may be registered once; a second registration fails
    /// rather than silently clobbering the earlier one.
    pub fn with_override(
        mut self,
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Self, TransformError> {
        let original = original.into();
        if let Some(existing) = self.overrides.get(&original) {
            return Err(TransformError::DuplicateOverride {
                resource: original,
                existing: existing.clone(),
            });
        }

        self.overrides.insert(original, replacement.into());
        Ok(self)
    }
}

impl ResourceTransform for PathOverrideTransform {
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        self.filter.apply(resources, kind, |resource| {
            let rewritten = self
                .overrides
                .get(resource)
                .cloned()
                .unwrap_or_else(|| resource.to_string());
            Ok(Some(rewritten))
        })
    }
}
