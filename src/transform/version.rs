use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};
use crate::transform::{ResourceTransform, TransformFilter};

const DEFAULT_VERSION_NAME: &str = "_";

/// Appends a cache-busting version parameter to matching references.
///
/// References that already carry the parameter are left alone. The check is a
/// case-insensitive substring search for `name=` anywhere past the start of the
/// reference, not a query-string parse; a reference whose query happens to contain
/// that text inside another value is treated as already versioned. Callers who need
/// stricter matching can pick a less collision-prone parameter name.
pub struct VersionTransform {
    filter: TransformFilter,
    version_value: String,
    version_name: String,
}

impl VersionTransform {
    /// Create a version transform appending `version_value` under the default
    /// parameter name `_`.
    pub fn new(
        kind: ResourceKind,
        scope: ResourceScope,
        version_value: impl Into<String>,
    ) -> Self {
        Self {
            filter: TransformFilter::new(kind, scope),
            version_value: version_value.into(),
            version_name: DEFAULT_VERSION_NAME.to_string(),
        }
    }

    /// Use `name` as the query parameter name instead of `_`.
    pub fn with_version_name(mut self, name: impl Into<String>) -> Self {
        self.version_name = name.into();
        self
    }

    fn rewrite(&self, resource: &str) -> String {
        let marker = format!("{}=", self.version_name.to_ascii_lowercase());
        let already_versioned = resource
            .to_ascii_lowercase()
            .find(&marker)
            .is_some_and(|index| index > 0);
        if already_versioned {
            return resource.to_string();
        }

        let separator = if resource.contains('?') { '&' } else { '?' };
        format!(
            "{resource}{separator}{}={}",
            self.version_name, self.version_value
        )
    }
}

impl ResourceTransform for VersionTransform {
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        self.filter
            .apply(resources, kind, |resource| Ok(Some(self.rewrite(resource))))
    }
}
