//! Tool versions and acceptable version ranges.
//!
//! Versions are parsed out of whatever a tool prints when asked for its
//! version (`Python 3.11.4`, `Docker version 24.0.7, build afdd53b`,
//! `Docker Compose version v2.23.0`). Acceptance only looks at
//! `(major, minor)`; the patch level is recorded for display.

use crate::error::{Result, SetupError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap());

/// A parsed tool version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first version-looking token from tool output.
    ///
    /// A missing patch component is recorded as 0.
    pub fn parse_from_output(output: &str) -> Option<Self> {
        let caps = VERSION_PATTERN.captures(output)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }

    /// The `(major, minor)` pair used for acceptance.
    pub fn series(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Widest minor span a bounded range may cover within one major version.
pub const MAX_SERIES_SPAN: u32 = 32;

/// Acceptable `(major, minor)` range for a tool.
///
/// Without an upper bound any version at or above `min` is accepted. With
/// one, the version's series must fall within `[min, max]` inclusive, so a
/// newer interpreter than `max` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    min: (u32, u32),
    max: Option<(u32, u32)>,
}

impl VersionRange {
    /// Accept `min` and anything newer.
    pub fn at_least(major: u32, minor: u32) -> Self {
        Self {
            min: (major, minor),
            max: None,
        }
    }

    /// Accept series from `min` to `max` inclusive.
    pub fn between(min: (u32, u32), max: (u32, u32)) -> Result<Self> {
        if max < min {
            return Err(SetupError::MalformedInput {
                message: format!(
                    "version range upper bound {}.{} is below lower bound {}.{}",
                    max.0, max.1, min.0, min.1
                ),
            });
        }
        if max.0 == min.0 && max.1 - min.1 > MAX_SERIES_SPAN {
            return Err(SetupError::MalformedInput {
                message: format!(
                    "version range {}.{}-{}.{} spans more than {} minor series",
                    min.0, min.1, max.0, max.1, MAX_SERIES_SPAN
                ),
            });
        }
        Ok(Self {
            min,
            max: Some(max),
        })
    }

    /// Lower bound.
    pub fn min(&self) -> (u32, u32) {
        self.min
    }

    /// Upper bound, if any.
    pub fn max(&self) -> Option<(u32, u32)> {
        self.max
    }

    /// Whether `version` satisfies this range.
    pub fn accepts(&self, version: &Version) -> bool {
        let series = version.series();
        if series < self.min {
            return false;
        }
        match self.max {
            Some(max) => series <= max,
            None => true,
        }
    }

    /// The concrete series worth looking for by name, lowest first.
    ///
    /// Used to build version-specific command names (`python3.11`,
    /// `python3.12`, ...). An open range only yields its minimum.
    pub fn series(&self) -> Vec<(u32, u32)> {
        match self.max {
            Some(max) if max.0 == self.min.0 => {
                (self.min.1..=max.1).map(|minor| (self.min.0, minor)).collect()
            }
            Some(max) => vec![self.min, max],
            None => vec![self.min],
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}.{}-{}.{}", self.min.0, self.min.1, max.0, max.1),
            None => write!(f, ">={}.{}", self.min.0, self.min.1),
        }
    }
}

impl FromStr for VersionRange {
    type Err = SetupError;

    /// Parse `"3.11"`, `">=3.11"` or `"3.11-3.13"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix(">=").unwrap_or(s).trim();
        match s.split_once('-') {
            Some((lo, hi)) => Self::between(parse_series(lo)?, parse_series(hi)?),
            None => {
                let (major, minor) = parse_series(s)?;
                Ok(Self::at_least(major, minor))
            }
        }
    }
}

fn parse_series(s: &str) -> Result<(u32, u32)> {
    let malformed = || SetupError::MalformedInput {
        message: format!("expected a MAJOR.MINOR version, got '{}'", s.trim()),
    };
    let (major, minor) = s.trim().split_once('.').ok_or_else(malformed)?;
    let major = major.parse().map_err(|_| malformed())?;
    let minor = minor.parse().map_err(|_| malformed())?;
    Ok((major, minor))
}
