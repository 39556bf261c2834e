//! Ordered application of transforms, plus the optional process-wide instance.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

use crate::error::TransformError;
use crate::model::ResourceKind;
use crate::transform::ResourceTransform;

/// An ordered chain of transforms applied left to right.
///
/// The output of each transform is the exact input of the next, so order is
/// significant: appending a version parameter before filling in extensions produces a
/// different result than the reverse. An empty pipeline returns its input unchanged.
///
/// Pipelines are built and configured once at startup, then shared immutably across
/// concurrently rendered pages.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn ResourceTransform>>,
}

impl TransformPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform to the end of the chain.
    pub fn push(&mut self, transform: impl ResourceTransform + 'static) {
        self.transforms.push(Box::new(transform));
    }

    /// Number of transforms in the chain.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns `true` when no transforms have been registered.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Run every transform over `resources` in registration order.
    ///
    /// The first transform error aborts the run; no later transform sees a partial
    /// result.
    pub fn process_resources(
        &self,
        resources: &[String],
        kind: ResourceKind,
    ) -> Result<Vec<String>, TransformError> {
        debug!(
            kind = %kind,
            transforms = self.transforms.len(),
            resources = resources.len(),
            "applying transform pipeline"
        );

        let mut current = resources.to_vec();
        for transform in &self.transforms {
            current = transform.process_resources(&current, kind)?;
        }

        Ok(current)
    }
}

/// Error returned when installing a second process-wide pipeline.
#[derive(Debug, Error)]
#[error("a shared transform pipeline is already installed")]
pub struct AlreadyInstalledError;

static SHARED: OnceLock<TransformPipeline> = OnceLock::new();

/// Install the process-wide pipeline.
///
/// Intended for applications that want one implicit pipeline rather than threading an
/// instance through their rendering layer. Configure the pipeline fully before
/// installing it; it cannot be replaced or mutated afterwards, which keeps concurrent
/// renders free of locking.
pub fn install_shared(pipeline: TransformPipeline) -> Result<(), AlreadyInstalledError> {
    SHARED.set(pipeline).map_err(|_| AlreadyInstalledError)
}

/// The process-wide pipeline, if one has been installed.
pub fn shared() -> Option<&'static TransformPipeline> {
    SHARED.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceScope;
    use crate::transform::{ExtensionTransform, UniqueTransform, VersionTransform};

    #[test]
    fn empty_pipeline_is_identity() {
        let pipeline = TransformPipeline::new();
        let input = vec!["a.js".to_string(), "b.css".to_string()];

        let output = pipeline
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("empty pipeline should not fail");

        assert_eq!(output, input);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn transform_order_changes_the_result() {
        let extension = || {
            ExtensionTransform::new("", ".js", ResourceKind::SCRIPTS, ResourceScope::ALL)
        };
        let version = || {
            VersionTransform::new(ResourceKind::SCRIPTS, ResourceScope::ALL, "1")
                .with_version_name("v")
        };
        let input = vec!["app".to_string()];

        let mut extension_first = TransformPipeline::new();
        extension_first.push(extension());
        extension_first.push(version());
        let output = extension_first
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("pipeline should not fail");
        assert_eq!(output, vec!["app.js?v=1"]);

        let mut version_first = TransformPipeline::new();
        version_first.push(version());
        version_first.push(extension());
        let output = version_first
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("pipeline should not fail");
        assert_eq!(output, vec!["app?v=1.js"]);
    }

    #[test]
    fn each_transform_consumes_the_previous_output() {
        let mut pipeline = TransformPipeline::new();
        pipeline.push(ExtensionTransform::new(
            "",
            ".js",
            ResourceKind::SCRIPTS,
            ResourceScope::ALL,
        ));
        pipeline.push(UniqueTransform::new(ResourceKind::ALL));
        assert_eq!(pipeline.len(), 2);

        // "app" and "app.js" only collide after the extension stage has run.
        let input = vec!["app".to_string(), "app.js".to_string()];
        let output = pipeline
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("pipeline should not fail");

        assert_eq!(output, vec!["app.js"]);
    }

    #[test]
    fn shared_pipeline_installs_exactly_once() {
        let mut pipeline = TransformPipeline::new();
        pipeline.push(UniqueTransform::new(ResourceKind::ALL));

        install_shared(pipeline).expect("first install should succeed");
        let installed = shared().expect("shared pipeline should be available");
        assert_eq!(installed.len(), 1);

        let result = install_shared(TransformPipeline::new());
        assert!(result.is_err());
    }
}
