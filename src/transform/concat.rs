use std::collections::BTreeMap;

use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};
use crate::transform::{ResourceTransform, TransformFilter, dedup_stable};

/// Substitutes concatenated group names for their member files.
///
/// Pages register the individual files they need; when several of them are served as
/// one concatenated file, every member collapses to the group name and the list is
/// deduplicated so the group appears exactly once, at the position of its first
/// member.
pub struct ConcatenationTransform {
    filter: TransformFilter,
    groups: BTreeMap<String, String>,
}

impl ConcatenationTransform {
    /// Create a concatenation transform for the declared kind and scope.
    pub fn new(kind: ResourceKind, scope: ResourceScope) -> Self {
        Self {
            filter: TransformFilter::new(kind, scope),
            groups: BTreeMap::new(),
        }
    }

    /// Map every member in `members` to `group_name`.
    ///
    /// A member may belong to exactly one group; assigning one a second time fails,
    /// including within a single batch.
    pub fn with_group<I, S>(
        mut self,
        group_name: impl Into<String>,
        members: I,
    ) -> Result<Self, TransformError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group_name = group_name.into();
        for member in members {
            let member = member.into();
            if let Some(existing) = self.groups.get(&member) {
                return Err(TransformError::DuplicateGroup {
                    resource: member,
                    existing: existing.clone(),
                });
            }
            self.groups.insert(member, group_name.clone());
        }

        Ok(self)
    }
}

impl ResourceTransform for ConcatenationTransform {
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        let substituted = self.filter.apply(resources, kind, |resource| {
            let rewritten = self
                .groups
                .get(resource)
                .cloned()
                .unwrap_or_else(|| resource.to_string());
            Ok(Some(rewritten))
        })?;

        // Collapsing several members into one group name introduces duplicates.
        if self.filter.kind().contains(kind) {
            Ok(dedup_stable(substituted))
        } else {
            Ok(substituted)
        }
    }
}
