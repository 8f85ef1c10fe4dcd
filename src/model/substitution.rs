//! Nucleotide substitution models and their static rate tables.

use std::fmt;
use std::str::FromStr;

// =#========================================================================#=
// SUBSTITUTION MODEL
// =#========================================================================#=
/// The closed set of supported nucleotide substitution models.
///
/// Every variant is described by a static [ModelSpec] (see [SubstitutionModel::spec])
/// holding its entity identifier, the rate-matrix element it maps to, its
/// tying pattern among the pairwise rates and whether base frequencies are
/// estimated.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstitutionModel {
    JC,
    K80,
    HKY,
    TrNef,
    TrN,
    K3P,
    K3Puf,
    TIMef,
    TIM,
    TVMef,
    TVM,
    SYM,
    GTR,
}

impl SubstitutionModel {
    /// All models, in canonical order.
    pub const ALL: [SubstitutionModel; 13] = [
        SubstitutionModel::JC,
        SubstitutionModel::K80,
        SubstitutionModel::HKY,
        SubstitutionModel::TrNef,
        SubstitutionModel::TrN,
        SubstitutionModel::K3P,
        SubstitutionModel::K3Puf,
        SubstitutionModel::TIMef,
        SubstitutionModel::TIM,
        SubstitutionModel::TVMef,
        SubstitutionModel::TVM,
        SubstitutionModel::SYM,
        SubstitutionModel::GTR,
    ];

    /// The label as written in configuration and file names, e.g. `"TrNef"`.
    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    /// The static description of this model.
    pub fn spec(&self) -> &'static ModelSpec {
        use SubstitutionModel::*;
        match self {
            JC => &JC_SPEC,
            K80 => &K80_SPEC,
            HKY => &HKY_SPEC,
            TrNef => &TRNEF_SPEC,
            TrN => &TRN_SPEC,
            K3P => &K3P_SPEC,
            K3Puf => &K3PUF_SPEC,
            TIMef => &TIMEF_SPEC,
            TIM => &TIM_SPEC,
            TVMef => &TVMEF_SPEC,
            TVM => &TVM_SPEC,
            SYM => &SYM_SPEC,
            GTR => &GTR_SPEC,
        }
    }

    /// Names of the free rate parameters, in declaration order.
    ///
    /// # Example
    /// ```
    /// use beastgen::model::SubstitutionModel;
    ///
    /// assert_eq!(SubstitutionModel::JC.free_rates(), Vec::<&str>::new());
    /// assert_eq!(SubstitutionModel::HKY.free_rates(), vec!["kappa"]);
    /// assert_eq!(SubstitutionModel::TrN.free_rates(), vec!["transversion", "ag"]);
    /// ```
    pub fn free_rates(&self) -> Vec<&'static str> {
        match &self.spec().rates {
            RateStructure::Kappa => vec!["kappa"],
            RateStructure::Pairwise(slots) => slots
                .iter()
                .filter_map(|slot| match slot {
                    RateSlot::Free(name) => Some(*name),
                    _ => None,
                })
                .collect(),
        }
    }
}

impl fmt::Display for SubstitutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SubstitutionModel {
    type Err = ();

    /// Parses a base model label (case-sensitive, e.g. `"K3Puf"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubstitutionModel::ALL
            .into_iter()
            .find(|model| model.label() == s)
            .ok_or(())
    }
}

// =#========================================================================#=
// MODEL TABLE
// =#========================================================================#=
/// Rate-matrix element a model is expressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMatrixElement {
    /// `<gtrModel>` with five pairwise rates (AC, AG, AT, CG, GT)
    Gtr,
    /// `<hkyModel>` with a single transition/transversion ratio
    Hky,
}

impl RateMatrixElement {
    /// XML element name.
    pub fn tag(&self) -> &'static str {
        match self {
            RateMatrixElement::Gtr => "gtrModel",
            RateMatrixElement::Hky => "hkyModel",
        }
    }
}

/// One pairwise rate of a [RateMatrixElement::Gtr] model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSlot {
    /// Fixed at 1.0, declared under the pair's own name (e.g. `ag`)
    Fixed,
    /// Free parameter declared here under the given name
    Free(&'static str),
    /// Reuses a free parameter declared by an earlier slot
    Tied(&'static str),
}

/// Tying pattern of a model's exchangeability rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateStructure {
    Kappa,
    /// Slots in the order AC, AG, AT, CG, GT
    Pairwise([RateSlot; 5]),
}

/// How base frequencies are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyMode {
    /// Fixed at 0.25 each
    Equal,
    /// Estimated, starting at 0.25 each
    Estimated,
}

/// Static description of a [SubstitutionModel].
#[derive(Debug)]
pub struct ModelSpec {
    /// Configuration label
    pub label: &'static str,
    /// Entity identifier in the document, also prefix of parameter ids
    pub id: &'static str,
    /// Human-readable description written as a comment
    pub description: &'static str,
    pub element: RateMatrixElement,
    pub rates: RateStructure,
    pub frequencies: FrequencyMode,
}

/// Element names of the five pairwise rates and the names of their fixed parameters.
pub const RATE_PAIRS: [(&str, &str); 5] = [
    ("rateAC", "ac"),
    ("rateAG", "ag"),
    ("rateAT", "at"),
    ("rateCG", "cg"),
    ("rateGT", "gt"),
];

use FrequencyMode::{Equal, Estimated};
use RateSlot::{Fixed, Free, Tied};

const ALL_FIXED: RateStructure = RateStructure::Pairwise([Fixed, Fixed, Fixed, Fixed, Fixed]);
const TRN_RATES: RateStructure = RateStructure::Pairwise([
    Free("transversion"),
    Free("ag"),
    Tied("transversion"),
    Tied("transversion"),
    Tied("transversion"),
]);
const K3P_RATES: RateStructure = RateStructure::Pairwise([
    Free("purine2pyrimidine"),
    Fixed,
    Free("pyrimidine2purine"),
    Tied("pyrimidine2purine"),
    Tied("purine2pyrimidine"),
]);
const TIM_RATES: RateStructure = RateStructure::Pairwise([
    Free("purine2pyrimidine"),
    Free("ag"),
    Free("pyrimidine2purine"),
    Tied("pyrimidine2purine"),
    Tied("purine2pyrimidine"),
]);
const TVM_RATES: RateStructure =
    RateStructure::Pairwise([Free("ac"), Fixed, Free("at"), Free("cg"), Free("gt")]);
const GTR_RATES: RateStructure =
    RateStructure::Pairwise([Free("ac"), Free("ag"), Free("at"), Free("cg"), Free("gt")]);

static JC_SPEC: ModelSpec = ModelSpec {
    label: "JC",
    id: "JC69",
    description: "The JC69 substitution model (Jukes & Cantor, 1969)",
    element: RateMatrixElement::Gtr,
    rates: ALL_FIXED,
    frequencies: Equal,
};
static K80_SPEC: ModelSpec = ModelSpec {
    label: "K80",
    id: "K80",
    description: "The K80 substitution model (Kimura, 1980)",
    element: RateMatrixElement::Hky,
    rates: RateStructure::Kappa,
    frequencies: Equal,
};
static HKY_SPEC: ModelSpec = ModelSpec {
    label: "HKY",
    id: "HKY",
    description: "The HKY substitution model (Hasegawa, Kishino & Yano, 1985)",
    element: RateMatrixElement::Hky,
    rates: RateStructure::Kappa,
    frequencies: Equal,
};
static TRNEF_SPEC: ModelSpec = ModelSpec {
    label: "TrNef",
    id: "TrNef",
    description: "The Tamura-Nei 1993 (TrNef) substitution model",
    element: RateMatrixElement::Gtr,
    rates: TRN_RATES,
    frequencies: Equal,
};
static TRN_SPEC: ModelSpec = ModelSpec {
    label: "TrN",
    id: "TrN",
    description: "The Tamura-Nei 1993 (TrN) substitution model",
    element: RateMatrixElement::Gtr,
    rates: TRN_RATES,
    frequencies: Estimated,
};
static K3P_SPEC: ModelSpec = ModelSpec {
    label: "K3P",
    id: "K3P",
    description: "The Kimura 1981 3-parameter (K3P) substitution model",
    element: RateMatrixElement::Gtr,
    rates: K3P_RATES,
    frequencies: Equal,
};
static K3PUF_SPEC: ModelSpec = ModelSpec {
    label: "K3Puf",
    id: "K3Puf",
    description: "The Kimura 1981 3-parameter (K3Puf) substitution model",
    element: RateMatrixElement::Gtr,
    rates: K3P_RATES,
    frequencies: Estimated,
};
static TIMEF_SPEC: ModelSpec = ModelSpec {
    label: "TIMef",
    id: "TIMef",
    description: "The transitional (TIMef) substitution model",
    element: RateMatrixElement::Gtr,
    rates: TIM_RATES,
    frequencies: Equal,
};
static TIM_SPEC: ModelSpec = ModelSpec {
    label: "TIM",
    id: "TIM",
    description: "The transitional (TIM) substitution model",
    element: RateMatrixElement::Gtr,
    rates: TIM_RATES,
    frequencies: Estimated,
};
static TVMEF_SPEC: ModelSpec = ModelSpec {
    label: "TVMef",
    id: "TVMef",
    description: "The transversional (TVMef) substitution model",
    element: RateMatrixElement::Gtr,
    rates: TVM_RATES,
    frequencies: Equal,
};
static TVM_SPEC: ModelSpec = ModelSpec {
    label: "TVM",
    id: "TVM",
    description: "The transversional (TVM) substitution model",
    element: RateMatrixElement::Gtr,
    rates: TVM_RATES,
    frequencies: Estimated,
};
static SYM_SPEC: ModelSpec = ModelSpec {
    label: "SYM",
    id: "SYM",
    description: "The symmetric (SYM) substitution model",
    element: RateMatrixElement::Gtr,
    rates: GTR_RATES,
    frequencies: Equal,
};
static GTR_SPEC: ModelSpec = ModelSpec {
    label: "GTR",
    id: "GTR",
    description: "The general time reversible (GTR) substitution model",
    element: RateMatrixElement::Gtr,
    rates: GTR_RATES,
    frequencies: Estimated,
};
