use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};
use crate::transform::{ResourceTransform, TransformFilter};

/// Fills in or upgrades file extensions on matching references.
///
/// A reference ending in the `from` suffix (and not already ending in the `to`
/// suffix, or any ignored suffix) gets the `to` suffix appended. Registering with an
/// empty `from` suffix matches every reference, which is how scripts can be listed
/// without any extension at all and still come out as `name.min.js`.
pub struct ExtensionTransform {
    filter: TransformFilter,
    from_extension: String,
    to_extension: String,
    ignore_extensions: Vec<String>,
}

impl ExtensionTransform {
    /// Create a transform rewriting `from_extension` suffixes to `to_extension` for
    /// the declared kind and scope.
    pub fn new(
        from_extension: impl Into<String>,
        to_extension: impl Into<String>,
        kind: ResourceKind,
        scope: ResourceScope,
    ) -> Self {
        Self {
            filter: TransformFilter::new(kind, scope),
            from_extension: from_extension.into(),
            to_extension: to_extension.into(),
            ignore_extensions: Vec::new(),
        }
    }

    /// Leave references ending in `extension` untouched even when they match the
    /// `from` suffix.
    pub fn with_ignored(mut self, extension: impl Into<String>) -> Self {
        self.ignore_extensions.push(extension.into());
        self
    }

    fn rewrite(&self, resource: &str) -> String {
        if !has_suffix_ignore_case(resource, &self.from_extension) {
            return resource.to_string();
        }
        if has_suffix_ignore_case(resource, &self.to_extension) {
            return resource.to_string();
        }
        if self
            .ignore_extensions
            .iter()
            .any(|extension| has_suffix_ignore_case(resource, extension))
        {
            return resource.to_string();
        }

        format!("{resource}{}", self.to_extension)
    }
}

impl ResourceTransform for ExtensionTransform {
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        self.filter
            .apply(resources, kind, |resource| Ok(Some(self.rewrite(resource))))
    }
}

/// ASCII-case-insensitive suffix test that never panics on multi-byte content.
fn has_suffix_ignore_case(value: &str, suffix: &str) -> bool {
    let value = value.as_bytes();
    let suffix = suffix.as_bytes();
    value.len() >= suffix.len() && value[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_the_target_extension_where_it_is_missing() {
        let transform = ExtensionTransform::new(
            ".js",
            ".min.js",
            ResourceKind::SCRIPTS,
            ResourceScope::ALL,
        );
        let input = vec!["a".to_string(), "a.js".to_string(), "a.min.js".to_string()];

        let output = transform
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("rewrite should not fail");

        assert_eq!(output, vec!["a", "a.js.min.js", "a.min.js"]);
    }

    #[test]
    fn suffix_comparison_ignores_case() {
        let transform = ExtensionTransform::new(
            ".js",
            ".min.js",
            ResourceKind::SCRIPTS,
            ResourceScope::ALL,
        );
        let input = vec!["widget.JS".to_string(), "widget.MIN.js".to_string()];

        let output = transform
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("rewrite should not fail");

        assert_eq!(output, vec!["widget.JS.min.js", "widget.MIN.js"]);
    }

    #[test]
    fn ignored_extensions_are_left_alone() {
        let transform = ExtensionTransform::new(
            ".js",
            ".min.js",
            ResourceKind::SCRIPTS,
            ResourceScope::ALL,
        )
        .with_ignored(".pack.js");
        let input = vec!["bundle.pack.js".to_string(), "plain.js".to_string()];

        let output = transform
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("rewrite should not fail");

        assert_eq!(output, vec!["bundle.pack.js", "plain.js.min.js"]);
    }

    #[test]
    fn empty_from_suffix_matches_everything() {
        let transform =
            ExtensionTransform::new("", ".css", ResourceKind::STYLES, ResourceScope::ALL);
        let input = vec!["site".to_string(), "print.css".to_string()];

        let output = transform
            .process_resources(&input, ResourceKind::STYLES)
            .expect("rewrite should not fail");

        assert_eq!(output, vec!["site.css", "print.css"]);
    }

    #[test]
    fn foreign_kind_is_identity() {
        let transform = ExtensionTransform::new(
            ".js",
            ".min.js",
            ResourceKind::SCRIPTS,
            ResourceScope::ALL,
        );
        let input = vec!["a.js".to_string()];

        let output = transform
            .process_resources(&input, ResourceKind::STYLES)
            .expect("rewrite should not fail");

        assert_eq!(output, input);
    }
}
