//! Natural Earth source selection: resolution and release version.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Simplification level of the Natural Earth admin-1 polygons.
/// See: https://www.naturalearthdata.com/downloads/
///
/// Islands are only included at `Fine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    /// 1:110m
    #[serde(rename = "110m")]
    Coarse,
    /// 1:50m
    #[serde(rename = "50m")]
    Medium,
    /// 1:10m
    #[default]
    #[serde(rename = "10m")]
    Fine,
}

impl Resolution {
    pub fn all() -> &'static [Resolution] {
        &[Resolution::Fine, Resolution::Medium, Resolution::Coarse]
    }

    /// Scale string used in Natural Earth file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Coarse => "110m",
            Resolution::Medium => "50m",
            Resolution::Fine => "10m",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "110m" | "coarse" => Ok(Resolution::Coarse),
            "50m" | "medium" => Ok(Resolution::Medium),
            "10m" | "fine" => Ok(Resolution::Fine),
            _ => Err(Error::UnsupportedResolution {
                got: s.to_string(),
                allowed: quoted_list(Resolution::all().iter().map(|r| r.as_str())),
            }),
        }
    }
}

/// Natural Earth releases available on the public S3 bucket.
/// See: https://github.com/nvkelso/natural-earth-vector/releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NeVersion {
    #[serde(rename = "v4.1.0")]
    V4_1_0,
    #[serde(rename = "v5.0.0")]
    V5_0_0,
    #[serde(rename = "v5.0.1")]
    V5_0_1,
    #[serde(rename = "v5.1.0")]
    V5_1_0,
    #[serde(rename = "v5.1.1")]
    V5_1_1,
    #[default]
    #[serde(rename = "v5.1.2")]
    V5_1_2,
}

impl NeVersion {
    pub fn all() -> &'static [NeVersion] {
        &[
            NeVersion::V4_1_0,
            NeVersion::V5_0_0,
            NeVersion::V5_0_1,
            NeVersion::V5_1_0,
            NeVersion::V5_1_1,
            NeVersion::V5_1_2,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NeVersion::V4_1_0 => "v4.1.0",
            NeVersion::V5_0_0 => "v5.0.0",
            NeVersion::V5_0_1 => "v5.0.1",
            NeVersion::V5_1_0 => "v5.1.0",
            NeVersion::V5_1_1 => "v5.1.1",
            NeVersion::V5_1_2 => "v5.1.2",
        }
    }

    /// Directory name on the S3 bucket.
    /// The 4.1.0 data is published under 4.1.1.
    pub fn aws_version(&self) -> &'static str {
        match self {
            NeVersion::V4_1_0 => "4.1.1",
            other => other.as_str().trim_start_matches('v'),
        }
    }
}

impl fmt::Display for NeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeVersion::all()
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnsupportedVersion {
                got: s.to_string(),
                allowed: quoted_list(NeVersion::all().iter().map(|v| v.as_str())),
            })
    }
}

fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}
