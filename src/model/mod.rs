//! The closed vocabularies an analysis is combined from.
//!
//! - [SubstitutionModel] with its static [ModelSpec] table, and labels of the
//!   form `base[+G|+I|+IG]` decomposed by [ModelLabel]
//! - [ClockFlavour]
//! - [TreePrior]
//! - [RootPrior]
//!
//! Clock flavours, tree priors and root-prior flavours parse strictly: an
//! unknown value is an [UnknownLabel] error. Substitution-model labels can be
//! decomposed leniently ([ModelLabel::decompose]) or strictly (`str::parse`).

pub mod clock;
pub mod label;
pub mod root_prior;
pub mod substitution;
pub mod tree_prior;

pub use clock::ClockFlavour;
pub use label::{BaseModel, ModelLabel, RateHeterogeneity};
pub use root_prior::{RootPrior, RootPriorFlavour};
pub use substitution::{
    FrequencyMode, ModelSpec, RateMatrixElement, RateSlot, RateStructure, SubstitutionModel,
};
pub use tree_prior::TreePrior;

use thiserror::Error;

/// Which vocabulary an unrecognized label was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    SubstitutionModel,
    ClockFlavour,
    TreePrior,
    RootPrior,
}

impl LabelKind {
    fn describe(&self) -> &'static str {
        match self {
            LabelKind::SubstitutionModel => "substitution model",
            LabelKind::ClockFlavour => "clock flavour",
            LabelKind::TreePrior => "tree prior flavour",
            LabelKind::RootPrior => "prior flavour",
        }
    }
}

/// A label that is not part of its closed vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} '{value}' not recognized.", .kind.describe())]
pub struct UnknownLabel {
    pub kind: LabelKind,
    pub value: String,
}

impl UnknownLabel {
    pub fn new(kind: LabelKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// One concrete (substitution model, clock flavour, tree prior) choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    pub model: ModelLabel,
    pub clock: ClockFlavour,
    pub tree_prior: TreePrior,
}

impl Combination {
    pub fn new(model: ModelLabel, clock: ClockFlavour, tree_prior: TreePrior) -> Self {
        Self {
            model,
            clock,
            tree_prior,
        }
    }
}
