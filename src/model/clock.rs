//! Molecular clock flavours.

use crate::model::{LabelKind, UnknownLabel};
use std::fmt;
use std::str::FromStr;

/// How substitution rates vary across the branches of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockFlavour {
    /// One rate for the whole tree
    Strict,
    /// Uncorrelated lognormal relaxed clock
    Ucln,
    /// Uncorrelated exponential relaxed clock
    Uced,
    /// Random local clock
    RandLocal,
}

impl ClockFlavour {
    pub const ALL: [ClockFlavour; 4] = [
        ClockFlavour::Strict,
        ClockFlavour::Ucln,
        ClockFlavour::Uced,
        ClockFlavour::RandLocal,
    ];

    /// Configuration label.
    pub fn label(&self) -> &'static str {
        match self {
            ClockFlavour::Strict => "strict",
            ClockFlavour::Ucln => "ucln",
            ClockFlavour::Uced => "uced",
            ClockFlavour::RandLocal => "randlocal",
        }
    }

    /// Element name of the branch-rate entity (always declared as `branchRates`).
    pub fn branch_rates_tag(&self) -> &'static str {
        match self {
            ClockFlavour::Strict => "strictClockBranchRates",
            ClockFlavour::Ucln | ClockFlavour::Uced => "discretizedBranchRates",
            ClockFlavour::RandLocal => "randomLocalClockModel",
        }
    }

    /// Identifier of the parameter reported as the overall rate.
    pub fn rate_parameter(&self) -> &'static str {
        match self {
            ClockFlavour::Ucln => "ucld.mean",
            ClockFlavour::Uced => "uced.mean",
            ClockFlavour::Strict | ClockFlavour::RandLocal => "clock.rate",
        }
    }

    /// Whether the flavour declares mean-rate, coefficient-of-variation and covariance statistics.
    pub fn has_rate_statistics(&self) -> bool {
        !matches!(self, ClockFlavour::Strict)
    }
}

impl fmt::Display for ClockFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClockFlavour {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockFlavour::ALL
            .into_iter()
            .find(|clock| clock.label() == s)
            .ok_or_else(|| UnknownLabel::new(LabelKind::ClockFlavour, s))
    }
}
