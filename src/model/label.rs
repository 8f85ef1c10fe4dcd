//! Substitution-model labels (`base[+suffix]`) and rate heterogeneity.

use crate::model::substitution::SubstitutionModel;
use crate::model::{LabelKind, UnknownLabel};
use log::warn;
use std::fmt;
use std::str::FromStr;

/// Delimiter between base model and heterogeneity suffix.
const SUFFIX_DELIMITER: char = '+';

// =#========================================================================#=
// RATE HETEROGENEITY
// =#========================================================================#=
/// Among-site rate heterogeneity modifiers of a substitution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RateHeterogeneity {
    #[default]
    None,
    /// Gamma-distributed rate categories (`+G`)
    Gamma,
    /// Proportion of invariant sites (`+I`)
    Invariant,
    /// Both (`+IG`)
    InvariantGamma,
}

impl RateHeterogeneity {
    /// All modifiers, in canonical order.
    pub const ALL: [RateHeterogeneity; 4] = [
        RateHeterogeneity::None,
        RateHeterogeneity::Gamma,
        RateHeterogeneity::Invariant,
        RateHeterogeneity::InvariantGamma,
    ];

    /// Whether gamma rate categories are modelled.
    pub fn has_gamma(&self) -> bool {
        matches!(self, RateHeterogeneity::Gamma | RateHeterogeneity::InvariantGamma)
    }

    /// Whether a proportion of invariant sites is modelled.
    pub fn has_invariant(&self) -> bool {
        matches!(self, RateHeterogeneity::Invariant | RateHeterogeneity::InvariantGamma)
    }

    /// Suffix as written after the `+`; `None` has no suffix.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            RateHeterogeneity::None => None,
            RateHeterogeneity::Gamma => Some("G"),
            RateHeterogeneity::Invariant => Some("I"),
            RateHeterogeneity::InvariantGamma => Some("IG"),
        }
    }

    /// Parses a suffix; unrecognized suffixes yield `None`.
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "G" => Some(RateHeterogeneity::Gamma),
            "I" => Some(RateHeterogeneity::Invariant),
            "IG" | "GI" => Some(RateHeterogeneity::InvariantGamma),
            _ => None,
        }
    }
}

// =#========================================================================#=
// MODEL LABEL
// =#========================================================================#=
/// Base of a decomposed label: a known model or an unrecognized name
/// carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseModel {
    Known(SubstitutionModel),
    Unrecognized(String),
}

/// A substitution-model label decomposed into base model and heterogeneity.
///
/// The original label text is kept verbatim for output naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelLabel {
    text: String,
    base: BaseModel,
    heterogeneity: RateHeterogeneity,
}

impl ModelLabel {
    /// Decomposes a label by splitting on the first `+`.
    ///
    /// - No `+`: heterogeneity is none.
    /// - Empty suffix, or a suffix equal to the base name: heterogeneity is none.
    /// - Unrecognized suffix: heterogeneity is none (logged).
    /// - Unknown base name, or more than one `+`: the base is [BaseModel::Unrecognized].
    ///
    /// # Example
    /// ```
    /// use beastgen::model::{BaseModel, ModelLabel, RateHeterogeneity, SubstitutionModel};
    ///
    /// let label = ModelLabel::decompose("GTR+IG");
    /// assert_eq!(label.base(), &BaseModel::Known(SubstitutionModel::GTR));
    /// assert_eq!(label.heterogeneity(), RateHeterogeneity::InvariantGamma);
    ///
    /// let label = ModelLabel::decompose("HKY+HKY");
    /// assert_eq!(label.heterogeneity(), RateHeterogeneity::None);
    /// ```
    pub fn decompose(text: &str) -> Self {
        let (base_text, suffix) = match text.split_once(SUFFIX_DELIMITER) {
            Some((base, suffix)) => (base, Some(suffix)),
            None => (text, None),
        };

        if suffix.is_some_and(|s| s.contains(SUFFIX_DELIMITER)) {
            return Self {
                text: text.to_string(),
                base: BaseModel::Unrecognized(text.to_string()),
                heterogeneity: RateHeterogeneity::None,
            };
        }

        let heterogeneity = match suffix {
            None => RateHeterogeneity::None,
            Some(s) if s.is_empty() || s == base_text => RateHeterogeneity::None,
            Some(s) => RateHeterogeneity::from_suffix(s).unwrap_or_else(|| {
                warn!("Ignoring unrecognized rate heterogeneity '+{s}' of model '{text}'");
                RateHeterogeneity::None
            }),
        };

        let base = match base_text.parse::<SubstitutionModel>() {
            Ok(model) => BaseModel::Known(model),
            Err(()) => BaseModel::Unrecognized(base_text.to_string()),
        };

        Self {
            text: text.to_string(),
            base,
            heterogeneity,
        }
    }

    /// Builds the canonical label of a known model and modifier, e.g. `HKY+G`.
    pub fn new(model: SubstitutionModel, heterogeneity: RateHeterogeneity) -> Self {
        let text = match heterogeneity.suffix() {
            Some(suffix) => format!("{}{SUFFIX_DELIMITER}{suffix}", model.label()),
            None => model.label().to_string(),
        };
        Self {
            text,
            base: BaseModel::Known(model),
            heterogeneity,
        }
    }

    /// The label exactly as configured.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn base(&self) -> &BaseModel {
        &self.base
    }

    /// The known base model, if any.
    pub fn model(&self) -> Option<SubstitutionModel> {
        match self.base {
            BaseModel::Known(model) => Some(model),
            BaseModel::Unrecognized(_) => None,
        }
    }

    pub fn heterogeneity(&self) -> RateHeterogeneity {
        self.heterogeneity
    }

    /// Returns an error unless the base model is known.
    pub fn require_known(&self) -> Result<SubstitutionModel, UnknownLabel> {
        self.model()
            .ok_or_else(|| UnknownLabel::new(LabelKind::SubstitutionModel, &self.text))
    }
}

impl FromStr for ModelLabel {
    type Err = UnknownLabel;

    /// Strict parsing: like [ModelLabel::decompose] but rejecting unknown base models.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = Self::decompose(s);
        label.require_known()?;
        Ok(label)
    }
}

impl fmt::Display for ModelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
