//! Momentum and length units carried by an event

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Momentum unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MomentumUnit {
    MeV,
    #[default]
    GeV,
}

/// Length/position unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
}

impl MomentumUnit {
    pub fn name(self) -> &'static str {
        match self {
            Self::MeV => "MEV",
            Self::GeV => "GEV",
        }
    }

    /// Scale factor turning a value in `self` into a value in `to`
    pub fn conversion_factor(self, to: Self) -> f64 {
        match (self, to) {
            (Self::MeV, Self::GeV) => 0.001,
            (Self::GeV, Self::MeV) => 1000.0,
            _ => 1.0,
        }
    }
}

impl LengthUnit {
    pub fn name(self) -> &'static str {
        match self {
            Self::Mm => "MM",
            Self::Cm => "CM",
        }
    }

    /// Scale factor turning a value in `self` into a value in `to`
    pub fn conversion_factor(self, to: Self) -> f64 {
        match (self, to) {
            (Self::Mm, Self::Cm) => 0.1,
            (Self::Cm, Self::Mm) => 10.0,
            _ => 1.0,
        }
    }
}

impl FromStr for MomentumUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MEV" => Ok(Self::MeV),
            "GEV" => Ok(Self::GeV),
            _ => Err(Error::UnknownUnit(s.to_string())),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MM" => Ok(Self::Mm),
            "CM" => Ok(Self::Cm),
            _ => Err(Error::UnknownUnit(s.to_string())),
        }
    }
}

impl std::fmt::Display for MomentumUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
