//! Numeric client versions.
//!
//! `MinClientVersion` is not a semantic version: it has two to four numeric
//! components (`major.minor[.build[.revision]]`) and no prerelease tag.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid client version `{input}`: {reason}")]
pub struct ParseClientVersionError {
    input: String,
    reason: &'static str,
}

/// The minimum client version a package requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl ClientVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }
}

impl FromStr for ClientVersion {
    type Err = ParseClientVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| {
            ParseClientVersionError {
                input: s.to_string(),
                reason,
            }
        };

        let parts = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err("components must be non-negative integers"));
                }
                part.parse::<u32>()
                    .map_err(|_| err("component out of range"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor)),
            [major, minor, build] => {
                Ok(Self {
                    build: Some(*build),
                    ..Self::new(*major, *minor)
                })
            }
            [major, minor, build, revision] => {
                Ok(Self {
                    major: *major,
                    minor: *minor,
                    build: Some(*build),
                    revision: Some(*revision),
                })
            }
            _ => Err(err("expected two to four components")),
        }
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for ClientVersion {
    type Error = ParseClientVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClientVersion> for String {
    fn from(value: ClientVersion) -> Self {
        value.to_string()
    }
}
