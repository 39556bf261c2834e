//! Declarative pipeline configuration loaded from JSON.
//!
//! Deployments can describe the transform chain in a configuration file instead of
//! code and realise it once at startup:
//!
//! ```text
//! {
//!   "transforms": [
//!     { "type": "extension", "from": ".js", "to": ".min.js", "kind": "scripts" },
//!     { "type": "version", "kind": "all", "value": "2024-06" },
//!     { "type": "unique", "kind": "all" }
//!   ]
//! }
//! ```
//!
//! A missing file is not an error; it simply yields an empty configuration so
//! applications work out of the box and add a file when they need one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::environment::RequestEnvironment;
use crate::error::TransformError;
use crate::model::{ResourceKind, ResourceScope};
use crate::pipeline::TransformPipeline;
use crate::transform::{
    ConcatenationTransform, ExtensionTransform, LocalRebaseTransform, PathOverrideTransform,
    UniqueTransform, VersionTransform,
};

/// Default configuration file name searched for by [`PipelineConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "assets.config.json";

/// Errors raised while loading or realising a pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the JSON configuration file.
    #[error("failed to parse `{}`: {source}", .path.display())]
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A configured transform was rejected while the pipeline was being built.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Ordered description of a transform chain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Transform entries, applied in the order they are listed.
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,
}

/// One configured transform entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformConfig {
    /// Rewrite `from` suffixes to `to`; see `ExtensionTransform`.
    Extension {
        /// Suffix to match on.
        from: String,
        /// Suffix to append.
        to: String,
        /// Resource kinds the transform applies to.
        kind: ResourceKind,
        /// Reference scopes the transform applies to.
        #[serde(default = "all_scopes")]
        scope: ResourceScope,
        /// Suffixes to leave untouched even when they match `from`.
        #[serde(default)]
        ignore: Vec<String>,
    },

    /// Rebase short local references onto the application root; see
    /// `LocalRebaseTransform`.
    Rebase {
        /// Resource kinds the transform applies to.
        kind: ResourceKind,
        /// Rooted template containing the `{}` placeholder.
        template: String,
    },

    /// Replace individual references by exact match; see `PathOverrideTransform`.
    Override {
        /// Resource kinds the transform applies to.
        kind: ResourceKind,
        /// Reference scopes the transform applies to.
        #[serde(default = "all_scopes")]
        scope: ResourceScope,
        /// Mapping from original reference to its replacement.
        overrides: BTreeMap<String, String>,
    },

    /// Collapse groups of files to their concatenated name; see
    /// `ConcatenationTransform`.
    Concatenation {
        /// Resource kinds the transform applies to.
        kind: ResourceKind,
        /// Reference scopes the transform applies to.
        #[serde(default = "all_scopes")]
        scope: ResourceScope,
        /// Mapping from group name to its member references.
        groups: BTreeMap<String, Vec<String>>,
    },

    /// Append a cache-busting version parameter; see `VersionTransform`.
    Version {
        /// Resource kinds the transform applies to.
        kind: ResourceKind,
        /// Reference scopes the transform applies to.
        #[serde(default = "all_scopes")]
        scope: ResourceScope,
        /// Version value to append.
        value: String,
        /// Query parameter name.
        #[serde(default = "default_version_name")]
        name: String,
    },

    /// Remove duplicate references; see `UniqueTransform`.
    Unique {
        /// Resource kinds the transform applies to.
        kind: ResourceKind,
    },
}

fn all_scopes() -> ResourceScope {
    ResourceScope::ALL
}

fn default_version_name() -> String {
    "_".to_string()
}

impl PipelineConfig {
    /// Load the configuration file from `dir`, falling back to an empty
    /// configuration when none exists.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        Self::from_path(&dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Read configuration from a specific JSON file.
    ///
    /// A missing file yields the default (empty) configuration; any other read or
    /// parse failure is an error.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no pipeline configuration found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        let config: Self = serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?;
        debug!(
            path = %path.display(),
            transforms = config.transforms.len(),
            "loaded pipeline configuration"
        );
        Ok(config)
    }

    /// Build the configured transform chain.
    ///
    /// `environment` is handed to any rebase entries; entries are realised in listed
    /// order, and the first invalid one (bad template, duplicate registration) aborts
    /// the build.
    pub fn into_pipeline(
        self,
        environment: Arc<dyn RequestEnvironment>,
    ) -> Result<TransformPipeline, ConfigError> {
        let mut pipeline = TransformPipeline::new();

        for entry in self.transforms {
            match entry {
                TransformConfig::Extension {
                    from,
                    to,
                    kind,
                    scope,
                    ignore,
                } => {
                    let mut transform = ExtensionTransform::new(from, to, kind, scope);
                    for extension in ignore {
                        transform = transform.with_ignored(extension);
                    }
                    pipeline.push(transform);
                }
                TransformConfig::Rebase { kind, template } => {
                    pipeline.push(LocalRebaseTransform::new(
                        kind,
                        template,
                        Arc::clone(&environment),
                    )?);
                }
                TransformConfig::Override {
                    kind,
                    scope,
                    overrides,
                } => {
                    let mut transform = PathOverrideTransform::new(kind, scope);
                    for (original, replacement) in overrides {
                        transform = transform.with_override(original, replacement)?;
                    }
                    pipeline.push(transform);
                }
                TransformConfig::Concatenation {
                    kind,
                    scope,
                    groups,
                } => {
                    let mut transform = ConcatenationTransform::new(kind, scope);
                    for (group, members) in groups {
                        transform = transform.with_group(group, members)?;
                    }
                    pipeline.push(transform);
                }
                TransformConfig::Version {
                    kind,
                    scope,
                    value,
                    name,
                } => {
                    pipeline
                        .push(VersionTransform::new(kind, scope, value).with_version_name(name));
                }
                TransformConfig::Unique { kind } => {
                    pipeline.push(UniqueTransform::new(kind));
                }
            }
        }

        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FixedRoot;
    use tempfile::tempdir;

    fn environment() -> Arc<dyn RequestEnvironment> {
        Arc::new(FixedRoot::new("/"))
    }

    #[test]
    fn missing_files_yield_an_empty_configuration() {
        let temp = tempdir().expect("failed to create temp dir");

        let config = PipelineConfig::discover(temp.path())
            .expect("missing files should not produce an error");

        assert!(config.transforms.is_empty());
        let pipeline = config
            .into_pipeline(environment())
            .expect("empty configuration should build");
        assert!(pipeline.is_empty());
    }

    #[test]
    fn malformed_files_are_a_parse_error() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "{not json").expect("failed to write config file");

        let result = PipelineConfig::from_path(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn configured_chains_process_resources() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"{
                "transforms": [
                    { "type": "extension", "from": "", "to": ".js", "kind": "scripts" },
                    { "type": "rebase", "kind": "scripts", "template": "~/scripts/{}" },
                    { "type": "version", "kind": "all", "value": "9", "name": "v" }
                ]
            }"#,
        )
        .expect("failed to write config file");

        let pipeline = PipelineConfig::from_path(&path)
            .expect("configuration should load")
            .into_pipeline(environment())
            .expect("configuration should build");

        let output = pipeline
            .process_resources(&["app".to_string()], ResourceKind::SCRIPTS)
            .expect("pipeline should run");
        assert_eq!(output, vec!["/scripts/app.js?v=9"]);
    }

    #[test]
    fn overrides_and_groups_build_from_configuration() {
        let raw = r#"{
            "transforms": [
                { "type": "override", "kind": "scripts",
                  "overrides": { "old.js": "new.js" } },
                { "type": "concatenation", "kind": "scripts",
                  "groups": { "bundle.js": ["a.js", "b.js"] } },
                { "type": "unique", "kind": "all" }
            ]
        }"#;
        let config: PipelineConfig = serde_json::from_str(raw).expect("configuration parses");

        let pipeline = config
            .into_pipeline(environment())
            .expect("configuration should build");
        let input = vec!["old.js".to_string(), "a.js".to_string(), "b.js".to_string()];
        let output = pipeline
            .process_resources(&input, ResourceKind::SCRIPTS)
            .expect("pipeline should run");

        assert_eq!(output, vec!["new.js", "bundle.js"]);
    }

    #[test]
    fn duplicate_group_members_fail_the_build() {
        let raw = r#"{
            "transforms": [
                { "type": "concatenation", "kind": "scripts",
                  "groups": { "x.js": ["a.js"], "y.js": ["a.js"] } }
            ]
        }"#;
        let config: PipelineConfig = serde_json::from_str(raw).expect("configuration parses");

        let result = config.into_pipeline(environment());
        assert!(matches!(
            result,
            Err(ConfigError::Transform(TransformError::DuplicateGroup { .. }))
        ));
    }

    #[test]
    fn unknown_kinds_are_rejected_at_parse_time() {
        let raw = r#"{ "transforms": [ { "type": "unique", "kind": "markup" } ] }"#;
        let result: Result<PipelineConfig, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }
}
