//! Collects registered resources and renders them as HTML tags.
//!
//! Pages register scripts and styles in two tiers: layout-wide resources first, then
//! page-specific ones. Emission concatenates the tiers in that order, runs the
//! combined list through the pipeline once, and produces one tag per line. Each kind
//! may be emitted once per render; a second attempt is a usage error rather than a
//! silent duplicate block of tags.

use std::borrow::Cow;

use thiserror::Error;
use tracing::debug;

use crate::error::TransformError;
use crate::model::ResourceKind;
use crate::pipeline::{self, TransformPipeline};

/// Errors raised while emitting registered resources.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Script tags were already emitted for this render.
    #[error("script tags were already emitted for this render")]
    ScriptsAlreadyEmitted,

    /// Style tags were already emitted for this render.
    #[error("style tags were already emitted for this render")]
    StylesAlreadyEmitted,

    /// A transform failed while the pipeline processed the registered resources.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Accumulates the scripts and styles registered while building a page and renders
/// them once each, in registration order, after the pipeline has rewritten them.
pub struct PageResources<'p> {
    pipeline: &'p TransformPipeline,
    layout_scripts: Vec<String>,
    layout_styles: Vec<String>,
    scripts: Vec<String>,
    styles: Vec<String>,
    scripts_written: bool,
    styles_written: bool,
}

impl<'p> PageResources<'p> {
    /// Create a collector that renders through `pipeline`.
    pub fn new(pipeline: &'p TransformPipeline) -> Self {
        Self {
            pipeline,
            layout_scripts: Vec::new(),
            layout_styles: Vec::new(),
            scripts: Vec::new(),
            styles: Vec::new(),
            scripts_written: false,
            styles_written: false,
        }
    }

    /// Create a collector backed by the process-wide pipeline, if one is installed.
    pub fn shared() -> Option<PageResources<'static>> {
        pipeline::shared().map(PageResources::new)
    }

    /// Register scripts emitted ahead of any page-specific scripts.
    pub fn register_layout_scripts<I, S>(&mut self, scripts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layout_scripts.extend(scripts.into_iter().map(Into::into));
    }

    /// Register page-specific scripts, emitted after the layout tier.
    pub fn register_scripts<I, S>(&mut self, scripts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts.extend(scripts.into_iter().map(Into::into));
    }

    /// Register styles emitted ahead of any page-specific styles.
    pub fn register_layout_styles<I, S>(&mut self, styles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layout_styles.extend(styles.into_iter().map(Into::into));
    }

    /// Register page-specific styles, emitted after the layout tier.
    pub fn register_styles<I, S>(&mut self, styles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.styles.extend(styles.into_iter().map(Into::into));
    }

    /// Render every registered script as a `<script>` tag, one per line.
    ///
    /// Layout scripts come first, then page scripts, with the combined list run
    /// through the pipeline as [`ResourceKind::SCRIPTS`].
    pub fn emit_scripts(&mut self) -> Result<String, RenderError> {
        if self.scripts_written {
            return Err(RenderError::ScriptsAlreadyEmitted);
        }
        self.scripts_written = true;

        let combined: Vec<String> = self
            .layout_scripts
            .iter()
            .chain(self.scripts.iter())
            .cloned()
            .collect();
        let processed = self
            .pipeline
            .process_resources(&combined, ResourceKind::SCRIPTS)?;
        debug!(count = processed.len(), "emitting script tags");

        let mut output = String::new();
        for script in &processed {
            output.push_str("<script src=\"");
            output.push_str(&escape_attr(script));
            output.push_str("\"></script>\n");
        }

        Ok(output)
    }

    /// Render every registered style as a stylesheet `<link>` tag, one per line.
    ///
    /// Layout styles come first, then page styles, with the combined list run through
    /// the pipeline as [`ResourceKind::STYLES`].
    pub fn emit_styles(&mut self) -> Result<String, RenderError> {
        if self.styles_written {
            return Err(RenderError::StylesAlreadyEmitted);
        }
        self.styles_written = true;

        let combined: Vec<String> = self
            .layout_styles
            .iter()
            .chain(self.styles.iter())
            .cloned()
            .collect();
        let processed = self
            .pipeline
            .process_resources(&combined, ResourceKind::STYLES)?;
        debug!(count = processed.len(), "emitting style tags");

        let mut output = String::new();
        for style in &processed {
            output.push_str("<link rel=\"stylesheet\" href=\"");
            output.push_str(&escape_attr(style));
            output.push_str("\">\n");
        }

        Ok(output)
    }
}

/// Escape the characters that are unsafe inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(&['<', '>', '&', '"', '\''][..]) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceScope;
    use crate::transform::VersionTransform;

    #[test]
    fn layout_resources_are_emitted_before_page_resources() {
        let pipeline = TransformPipeline::new();
        let mut resources = PageResources::new(&pipeline);
        resources.register_scripts(["/page.js"]);
        resources.register_layout_scripts(["/layout.js"]);

        let output = resources.emit_scripts().expect("emission should succeed");

        assert_eq!(
            output,
            "<script src=\"/layout.js\"></script>\n<script src=\"/page.js\"></script>\n"
        );
    }

    #[test]
    fn styles_render_as_stylesheet_links() {
        let pipeline = TransformPipeline::new();
        let mut resources = PageResources::new(&pipeline);
        resources.register_layout_styles(["/site.css"]);
        resources.register_styles(["/page.css"]);

        let output = resources.emit_styles().expect("emission should succeed");

        assert_eq!(
            output,
            "<link rel=\"stylesheet\" href=\"/site.css\">\n<link rel=\"stylesheet\" href=\"/page.css\">\n"
        );
    }

    #[test]
    fn registered_resources_run_through_the_pipeline() {
        let mut pipeline = TransformPipeline::new();
        pipeline.push(VersionTransform::new(
            ResourceKind::ALL,
            ResourceScope::ALL,
            "7",
        ));
        let mut resources = PageResources::new(&pipeline);
        resources.register_scripts(["/app.js"]);

        let output = resources.emit_scripts().expect("emission should succeed");

        assert_eq!(output, "<script src=\"/app.js?_=7\"></script>\n");
    }

    #[test]
    fn each_kind_may_be_emitted_once() {
        let pipeline = TransformPipeline::new();
        let mut resources = PageResources::new(&pipeline);
        resources.register_scripts(["/app.js"]);
        resources.register_styles(["/site.css"]);

        resources.emit_scripts().expect("first emission succeeds");
        assert!(matches!(
            resources.emit_scripts(),
            Err(RenderError::ScriptsAlreadyEmitted)
        ));

        resources.emit_styles().expect("first emission succeeds");
        assert!(matches!(
            resources.emit_styles(),
            Err(RenderError::StylesAlreadyEmitted)
        ));
    }

    #[test]
    fn emitting_one_kind_does_not_block_the_other() {
        let pipeline = TransformPipeline::new();
        let mut resources = PageResources::new(&pipeline);

        resources.emit_scripts().expect("scripts emit");
        resources.emit_styles().expect("styles still emit");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let pipeline = TransformPipeline::new();
        let mut resources = PageResources::new(&pipeline);
        resources.register_scripts(["/app.js?a=1&b=\"2\""]);

        let output = resources.emit_scripts().expect("emission should succeed");

        assert_eq!(
            output,
            "<script src=\"/app.js?a=1&amp;b=&quot;2&quot;\"></script>\n"
        );
    }
}
