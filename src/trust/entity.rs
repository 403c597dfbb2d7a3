// trust/entity.rs - Entities, Assertion Levels and Validity Levels

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use super::error::TrustError;

/// Opaque unique name of an entity in the trust network
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Create a name from anything string-like
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl Borrow<str> for EntityName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strength of a trust assertion issued by a signer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionLevel {
    /// Full vouching, propagates through complete introducers
    Complete,

    /// Weak vouching, two independent signers are needed
    Partial,
}

impl AssertionLevel {
    /// Whether an assertion at this level is at least as strong as `required`
    pub fn satisfies(&self, required: AssertionLevel) -> bool {
        match required {
            AssertionLevel::Partial => true,
            AssertionLevel::Complete => *self == AssertionLevel::Complete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssertionLevel::Complete => "complete",
            AssertionLevel::Partial => "partial",
        }
    }
}

impl fmt::Display for AssertionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssertionLevel {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(AssertionLevel::Complete),
            "partial" => Ok(AssertionLevel::Partial),
            _ => Err(TrustError::InvalidLevel(s.to_owned())),
        }
    }
}

/// Validity of an entity as seen from one viewer
///
/// Variants are declared in lattice order, so `Invalid < Marginal < Complete`.
/// `Implicit` sorts above everything and is only ever the viewer's own level.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidityLevel {
    /// No acceptable endorsement chain
    #[default]
    Invalid,

    /// Endorsed by at least two distinct valid signers
    Marginal,

    /// Endorsed completely by the viewer or by a complete entity
    Complete,

    /// The viewer itself
    Implicit,
}

impl ValidityLevel {
    /// Whether an entity at this level may act as an introducer on a path
    pub fn is_valid(&self) -> bool {
        !matches!(self, ValidityLevel::Invalid)
    }

    /// Levels that cannot be raised any further within one computation
    pub fn is_terminal(&self) -> bool {
        matches!(self, ValidityLevel::Complete | ValidityLevel::Implicit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidityLevel::Invalid => "invalid",
            ValidityLevel::Marginal => "marginal",
            ValidityLevel::Complete => "complete",
            ValidityLevel::Implicit => "implicit",
        }
    }
}

impl fmt::Display for ValidityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
