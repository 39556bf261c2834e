//! Classification types shared by every transform in the pipeline.
//!
//! Resource lists carry a [`ResourceKind`] describing what they will be rendered as,
//! and each individual reference has a [`ResourceScope`] derived from its shape. Both
//! are small bitmasks so a transform can declare itself for one classification or for
//! several at once.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Bitmask describing which resource lists a transform applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKind(u8);

impl ResourceKind {
  /// Matches no resource lists.
  pub const NONE: Self = Self(0);
  /// Script resources, rendered as `<script>` tags.
  pub const SCRIPTS: Self = Self(1);
  /// Style resources, rendered as `<link rel="stylesheet">` tags.
  pub const STYLES: Self = Self(1 << 1);
  /// Script and style resources.
  pub const ALL: Self = Self(1 | 1 << 1);

  /// Returns `true` when every flag in `other` is also present in `self`.
  ///
  /// A transform declared for [`ResourceKind::SCRIPTS`] therefore does not fire when a
  /// caller requests [`ResourceKind::ALL`]; the renderer always requests a single kind.
  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for ResourceKind {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self.0 {
      0 => "none",
      1 => "scripts",
      2 => "styles",
      _ => "all",
    })
  }
}

/// Error returned when parsing an unrecognised resource-kind name.
#[derive(Debug, Error)]
#[error("unknown resource kind `{0}`")]
pub struct UnknownResourceKind(String);

impl FromStr for ResourceKind {
  type Err = UnknownResourceKind;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "none" => Ok(Self::NONE),
      "scripts" => Ok(Self::SCRIPTS),
      "styles" => Ok(Self::STYLES),
      "all" => Ok(Self::ALL),
      _ => Err(UnknownResourceKind(value.to_string())),
    }
  }
}

impl<'de> Deserialize<'de> for ResourceKind {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
  }
}

/// Bitmask describing which individual resource references a transform applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceScope(u8);

impl ResourceScope {
  /// Matches no references.
  pub const NONE: Self = Self(0);
  /// References served by the application itself (`~/`, `/`, or relative names).
  pub const LOCAL: Self = Self(1);
  /// Absolute URLs and protocol-relative `//` references.
  pub const REMOTE: Self = Self(1 << 1);
  /// Local and remote references.
  pub const ALL: Self = Self(1 | 1 << 1);

  /// Returns `true` when every flag in `other` is also present in `self`.
  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  /// Classify a single resource reference as local or remote.
  ///
  /// References beginning with the literal `//` inherit the page protocol and are
  /// remote, as is anything carrying an explicit URI scheme such as `https:` or
  /// `ftp:`. Everything else is treated as local.
  pub fn of(resource: &str) -> Self {
    if resource.starts_with("//") || absolute_uri_pattern().is_match(resource) {
      Self::REMOTE
    } else {
      Self::LOCAL
    }
  }
}

impl BitOr for ResourceScope {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl fmt::Display for ResourceScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self.0 {
      0 => "none",
      1 => "local",
      2 => "remote",
      _ => "all",
    })
  }
}

/// Error returned when parsing an unrecognised resource-scope name.
#[derive(Debug, Error)]
#[error("unknown resource scope `{0}`")]
pub struct UnknownResourceScope(String);

impl FromStr for ResourceScope {
  type Err = UnknownResourceScope;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "none" => Ok(Self::NONE),
      "local" => Ok(Self::LOCAL),
      "remote" => Ok(Self::REMOTE),
      "all" => Ok(Self::ALL),
      _ => Err(UnknownResourceScope(value.to_string())),
    }
  }
}

impl<'de> Deserialize<'de> for ResourceScope {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
  }
}

fn absolute_uri_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN
    .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("invalid URI scheme regex"))
}
