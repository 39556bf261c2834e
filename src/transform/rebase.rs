use std::borrow::Cow;
use std::sync::Arc;

use crate::environment::{RequestEnvironment, to_application_absolute};
use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};
use crate::transform::{ResourceTransform, TransformFilter};

const PLACEHOLDER: &str = "{}";

/// Rebases short local references onto the application root of the active request.
///
/// A template of `~/scripts/{}` lets pages register `app.js` and have it come out as
/// `/portal/scripts/app.js` when the application is mounted at `/portal`. References
/// already rooted at `~/` or `/` skip the template and are resolved directly. Remote
/// references are never rebased; the scope is fixed to local.
pub struct LocalRebaseTransform {
    filter: TransformFilter,
    template: String,
    environment: Arc<dyn RequestEnvironment>,
}

impl LocalRebaseTransform {
    /// Create a rebase transform for the declared kind.
    ///
    /// The template must start with `~/` or `/` and contain the `{}` placeholder that
    /// receives the original reference; anything else is rejected here rather than at
    /// render time.
    pub fn new(
        kind: ResourceKind,
        template: impl Into<String>,
        environment: Arc<dyn RequestEnvironment>,
    ) -> Result<Self, TransformError> {
        let template = template.into();
        let rooted = template.starts_with("~/") || template.starts_with('/');
        if !rooted || !template.contains(PLACEHOLDER) {
            return Err(TransformError::InvalidRebaseTemplate { template });
        }

        Ok(Self {
            filter: TransformFilter::new(kind, ResourceScope::LOCAL),
            template,
            environment,
        })
    }

    fn rewrite(&self, resource: &str) -> Result<Option<String>, TransformError> {
        let virtual_path: Cow<'_, str> = if resource.starts_with("~/") || resource.starts_with('/')
        {
            Cow::Borrowed(resource)
        } else {
            Cow::Owned(self.template.replace(PLACEHOLDER, resource))
        };

        let root = self
            .environment
            .application_root()
            .ok_or(TransformError::MissingRequestContext)?;

        to_application_absolute(&virtual_path, &root).map(Some)
    }
}

impl ResourceTransform for LocalRebaseTransform {
    fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        self.filter
            .apply(resources, kind, |resource| self.rewrite(resource))
    }
}
