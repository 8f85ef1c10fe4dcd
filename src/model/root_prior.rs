//! Optional prior on the age of the root.

use crate::model::{LabelKind, UnknownLabel};
use std::fmt;
use std::str::FromStr;

/// Distribution family of a [RootPrior].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootPriorFlavour {
    /// Parameters are (min, max)
    Uniform,
    /// Parameters are (mean, stdev)
    Normal,
}

impl RootPriorFlavour {
    /// Configuration label.
    pub fn label(&self) -> &'static str {
        match self {
            RootPriorFlavour::Uniform => "unif",
            RootPriorFlavour::Normal => "norm",
        }
    }
}

impl fmt::Display for RootPriorFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RootPriorFlavour {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unif" => Ok(RootPriorFlavour::Uniform),
            "norm" => Ok(RootPriorFlavour::Normal),
            _ => Err(UnknownLabel::new(LabelKind::RootPrior, s)),
        }
    }
}

/// Prior on `treeModel.rootHeight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootPrior {
    pub flavour: RootPriorFlavour,
    /// Minimum (uniform) or mean (normal)
    pub first: f64,
    /// Maximum (uniform) or standard deviation (normal)
    pub second: f64,
}

impl RootPrior {
    pub fn uniform(min: f64, max: f64) -> Self {
        Self {
            flavour: RootPriorFlavour::Uniform,
            first: min,
            second: max,
        }
    }

    pub fn normal(mean: f64, stdev: f64) -> Self {
        Self {
            flavour: RootPriorFlavour::Normal,
            first: mean,
            second: stdev,
        }
    }
}
