//! Tree priors: speciation and coalescent processes.

use crate::model::{LabelKind, UnknownLabel};
use std::fmt;
use std::str::FromStr;

/// Prior over node ages of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreePrior {
    BirthDeath,
    Yule,
    ConstantCoalescent,
    ExponentialCoalescent,
    LogisticCoalescent,
}

impl TreePrior {
    pub const ALL: [TreePrior; 5] = [
        TreePrior::BirthDeath,
        TreePrior::Yule,
        TreePrior::ConstantCoalescent,
        TreePrior::ExponentialCoalescent,
        TreePrior::LogisticCoalescent,
    ];

    /// Configuration label.
    pub fn label(&self) -> &'static str {
        match self {
            TreePrior::BirthDeath => "bd",
            TreePrior::Yule => "yule",
            TreePrior::ConstantCoalescent => "concoal",
            TreePrior::ExponentialCoalescent => "expcoal",
            TreePrior::LogisticCoalescent => "logcoal",
        }
    }

    /// Identifier of the demographic or speciation model entity.
    pub fn model_id(&self) -> &'static str {
        match self {
            TreePrior::BirthDeath => "birthDeath",
            TreePrior::Yule => "yule",
            TreePrior::ConstantCoalescent => "constant",
            TreePrior::ExponentialCoalescent => "exponential",
            TreePrior::LogisticCoalescent => "logistic",
        }
    }

    /// Element name of the demographic or speciation model entity.
    pub fn model_tag(&self) -> &'static str {
        match self {
            TreePrior::BirthDeath => "birthDeathModel",
            TreePrior::Yule => "yuleModel",
            TreePrior::ConstantCoalescent => "constantSize",
            TreePrior::ExponentialCoalescent => "exponentialGrowth",
            TreePrior::LogisticCoalescent => "logisticGrowth",
        }
    }

    /// Whether this is a speciation (as opposed to coalescent) process.
    pub fn is_speciation(&self) -> bool {
        matches!(self, TreePrior::BirthDeath | TreePrior::Yule)
    }

    /// Identifier of the likelihood entity of the tree under this prior.
    pub fn likelihood_id(&self) -> &'static str {
        if self.is_speciation() {
            "speciation"
        } else {
            "coalescent"
        }
    }

    /// Element name of the likelihood entity.
    pub fn likelihood_tag(&self) -> &'static str {
        if self.is_speciation() {
            "speciationLikelihood"
        } else {
            "coalescentLikelihood"
        }
    }
}

impl fmt::Display for TreePrior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TreePrior {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreePrior::ALL
            .into_iter()
            .find(|prior| prior.label() == s)
            .ok_or_else(|| UnknownLabel::new(LabelKind::TreePrior, s))
    }
}
