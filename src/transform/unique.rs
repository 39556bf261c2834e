use crate::error::TransformError;
use crate::model::ResourceKind;
use crate::transform::{ResourceTransform, dedup_stable};

/// Removes duplicate references from the whole list, keeping first occurrences.
///
/// Unlike the per-item transforms this one has no scope filter: a duplicate is a
/// duplicate whether the reference is local or remote.
pub struct UniqueTransform {
    kind: ResourceKind,
}

impl UniqueTransform {
    /// Create a deduplication transform for the declared kind.
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl ResourceTransform for UniqueTransform {
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        if !self.kind.contains(kind) {
            return Ok(resources.to_vec());
        }

        Ok(dedup_stable(resources.to_vec()))
    }
}
