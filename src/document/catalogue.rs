//! The active parameters of one analysis and what acts on them.
//!
//! The operator set, the prior block and the parameter log all branch on the
//! same choices (substitution model, rate heterogeneity, clock flavour, tree
//! prior). [ParameterCatalogue] makes those choices once: every contribution
//! registers its parameters together with their operators, priors and log
//! columns, and the section writers only filter by [ParameterGroup].

use crate::config::AnalysisSettings;
use crate::model::{
    ClockFlavour, FrequencyMode, ModelLabel, RateStructure, RootPriorFlavour, SubstitutionModel,
    TreePrior,
};

/// Scale factor of all scale and up-down operators.
pub const SCALE_FACTOR: f64 = 0.75;

/// Part of the model a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterGroup {
    Substitution,
    SiteHeterogeneity,
    Clock,
    TreePrior,
    Tree,
}

/// How a parameter takes part in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    /// Estimated; has at least one operator and a prior
    Free,
    /// Declared with a fixed value
    Fixed,
    /// Tree node heights, moved by operators and constrained by the tree prior
    TreeState,
    /// Auxiliary state moved by operators without a prior of its own
    Latent,
    /// Derived quantity
    Statistic,
}

/// A declared parameter or statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub group: ParameterGroup,
    pub role: ParameterRole,
}

/// Kinds of MCMC operators.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorKind {
    Scale,
    DeltaExchange { delta: f64 },
    Swap { size: u32 },
    UniformInteger,
    Uniform,
    /// Scales the target up and `down` down
    UpDown { down: String },
    RandomWalk { window: f64, absorbing: bool },
    BitFlip,
    SubtreeSlide { size: f64 },
    NarrowExchange,
    WideExchange,
    WilsonBalding,
}

impl OperatorKind {
    /// Element name of the operator.
    pub fn tag(&self) -> &'static str {
        match self {
            OperatorKind::Scale => "scaleOperator",
            OperatorKind::DeltaExchange { .. } => "deltaExchange",
            OperatorKind::Swap { .. } => "swapOperator",
            OperatorKind::UniformInteger => "uniformIntegerOperator",
            OperatorKind::Uniform => "uniformOperator",
            OperatorKind::UpDown { .. } => "upDownOperator",
            OperatorKind::RandomWalk { .. } => "randomWalkOperator",
            OperatorKind::BitFlip => "bitFlipOperator",
            OperatorKind::SubtreeSlide { .. } => "subtreeSlide",
            OperatorKind::NarrowExchange => "narrowExchange",
            OperatorKind::WideExchange => "wideExchange",
            OperatorKind::WilsonBalding => "wilsonBalding",
        }
    }

    /// Whether the operator changes the tree topology.
    pub fn is_topology(&self) -> bool {
        matches!(
            self,
            OperatorKind::SubtreeSlide { .. }
                | OperatorKind::NarrowExchange
                | OperatorKind::WideExchange
                | OperatorKind::WilsonBalding
        )
    }
}

/// An operator on one target.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSpec {
    pub group: ParameterGroup,
    pub kind: OperatorKind,
    pub weight: f64,
    /// Identifier of the parameter (or tree model) operated on
    pub target: String,
}

impl OperatorSpec {
    /// Element name of the target reference.
    pub fn target_tag(&self) -> &'static str {
        if self.kind.is_topology() {
            "treeModel"
        } else {
            "parameter"
        }
    }
}

/// Prior distributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriorDistribution {
    Uniform { lower: f64, upper: f64 },
    OneOnX,
    Laplace { mean: f64, scale: f64 },
    Gamma { shape: f64, scale: f64 },
    Exponential { mean: f64 },
    LogNormal { mean: f64, stdev: f64 },
    Poisson { mean: f64 },
    Normal { mean: f64, stdev: f64 },
}

impl PriorDistribution {
    pub fn tag(&self) -> &'static str {
        match self {
            PriorDistribution::Uniform { .. } => "uniformPrior",
            PriorDistribution::OneOnX => "oneOnXPrior",
            PriorDistribution::Laplace { .. } => "laplacePrior",
            PriorDistribution::Gamma { .. } => "gammaPrior",
            PriorDistribution::Exponential { .. } => "exponentialPrior",
            PriorDistribution::LogNormal { .. } => "logNormalPrior",
            PriorDistribution::Poisson { .. } => "poissonPrior",
            PriorDistribution::Normal { .. } => "normalPrior",
        }
    }
}

/// A prior on one parameter or statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorSpec {
    pub group: ParameterGroup,
    pub distribution: PriorDistribution,
    /// Element name of the target reference (`parameter` or `statistic`)
    pub target_tag: &'static str,
    pub target: String,
    /// Free parameter the prior constrains, if the target is a statistic of it
    pub constrains: Option<String>,
}

impl PriorSpec {
    /// The free parameter constrained by this prior.
    pub fn constrained_parameter(&self) -> &str {
        self.constrains.as_deref().unwrap_or(&self.target)
    }
}

/// A column of the parameter log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogColumn {
    pub group: ParameterGroup,
    pub tag: &'static str,
    pub id: String,
}

// =#========================================================================#=
// PARAMETER CATALOGUE
// =#========================================================================#=
/// Parameters, operators, priors and log columns of one analysis.
///
/// # Example
/// ```
/// use beastgen::document::ParameterCatalogue;
/// use beastgen::model::{ClockFlavour, ModelLabel, TreePrior};
/// use beastgen::config::AnalysisSettings;
///
/// let settings = AnalysisSettings::default();
/// let label = ModelLabel::decompose("GTR+G");
/// let catalogue = ParameterCatalogue::new(&label, ClockFlavour::Strict, TreePrior::Yule, &settings, 4);
/// assert!(catalogue.free_parameter_ids().contains(&"GTR.ac"));
/// assert!(catalogue.free_parameter_ids().contains(&"alpha"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParameterCatalogue {
    parameters: Vec<Parameter>,
    operators: Vec<OperatorSpec>,
    priors: Vec<PriorSpec>,
    log_columns: Vec<LogColumn>,
}

// ============================================================================
// Building (pub)
// ============================================================================
impl ParameterCatalogue {
    /// Collects the active parameters for the given choices.
    ///
    /// # Arguments
    /// * `label` - Substitution model label; an unrecognized base model
    ///   contributes no substitution parameters
    /// * `clock` - Clock flavour
    /// * `tree_prior` - Tree prior
    /// * `settings` - Supplies the root prior and the topology flag
    /// * `num_taxa` - Number of taxa (weight of the rate-category swap)
    pub fn new(
        label: &ModelLabel,
        clock: ClockFlavour,
        tree_prior: TreePrior,
        settings: &AnalysisSettings,
        num_taxa: usize,
    ) -> Self {
        let mut catalogue = Self::default();

        if let Some(model) = label.model() {
            catalogue.add_substitution(model);
        }
        catalogue.add_heterogeneity(label);
        catalogue.add_clock(clock, num_taxa);
        catalogue.add_tree_prior(tree_prior);
        catalogue.add_tree(settings);

        catalogue
    }
}

// ============================================================================
// Querying (pub)
// ============================================================================
impl ParameterCatalogue {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Identifiers of all free parameters.
    pub fn free_parameter_ids(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.role == ParameterRole::Free)
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn operators(&self) -> &[OperatorSpec] {
        &self.operators
    }

    pub fn operators_in(&self, group: ParameterGroup) -> impl Iterator<Item = &OperatorSpec> {
        self.operators.iter().filter(move |op| op.group == group)
    }

    pub fn priors(&self) -> &[PriorSpec] {
        &self.priors
    }

    pub fn priors_in(&self, group: ParameterGroup) -> impl Iterator<Item = &PriorSpec> {
        self.priors.iter().filter(move |prior| prior.group == group)
    }

    pub fn log_columns_in(&self, group: ParameterGroup) -> impl Iterator<Item = &LogColumn> {
        self.log_columns
            .iter()
            .filter(move |column| column.group == group)
    }
}

// ============================================================================
// Contributions (private)
// ============================================================================
impl ParameterCatalogue {
    fn declare(&mut self, group: ParameterGroup, role: ParameterRole, id: impl Into<String>) {
        self.parameters.push(Parameter {
            id: id.into(),
            group,
            role,
        });
    }

    fn operate(&mut self, group: ParameterGroup, kind: OperatorKind, weight: f64, target: &str) {
        self.operators.push(OperatorSpec {
            group,
            kind,
            weight,
            target: target.to_string(),
        });
    }

    fn prior(&mut self, group: ParameterGroup, distribution: PriorDistribution, target: &str) {
        self.priors.push(PriorSpec {
            group,
            distribution,
            target_tag: "parameter",
            target: target.to_string(),
            constrains: None,
        });
    }

    fn log(&mut self, group: ParameterGroup, tag: &'static str, id: &str) {
        self.log_columns.push(LogColumn {
            group,
            tag,
            id: id.to_string(),
        });
    }

    /// Declares a free parameter with a scale operator, a prior and a log column.
    fn free_scaled(
        &mut self,
        group: ParameterGroup,
        id: &str,
        weight: f64,
        distribution: PriorDistribution,
    ) {
        self.declare(group, ParameterRole::Free, id);
        self.operate(group, OperatorKind::Scale, weight, id);
        self.prior(group, distribution, id);
        self.log(group, "parameter", id);
    }

    fn add_substitution(&mut self, model: SubstitutionModel) {
        use ParameterGroup::Substitution;
        let spec = model.spec();

        let distribution = match spec.rates {
            RateStructure::Kappa => PriorDistribution::LogNormal {
                mean: 1.0,
                stdev: 1.25,
            },
            RateStructure::Pairwise(_) => PriorDistribution::Gamma {
                shape: 0.05,
                scale: 10.0,
            },
        };
        for rate in model.free_rates() {
            self.free_scaled(Substitution, &format!("{}.{rate}", spec.id), 0.1, distribution);
        }

        let frequencies = format!("{}.frequencies", spec.id);
        match spec.frequencies {
            FrequencyMode::Equal => {
                self.declare(Substitution, ParameterRole::Fixed, frequencies.as_str());
            }
            FrequencyMode::Estimated => {
                self.declare(Substitution, ParameterRole::Free, frequencies.as_str());
                self.operate(
                    Substitution,
                    OperatorKind::DeltaExchange { delta: 0.01 },
                    0.1,
                    &frequencies,
                );
                self.prior(Substitution, UNIT_INTERVAL, &frequencies);
            }
        }
        self.log(Substitution, "parameter", &frequencies);
    }

    fn add_heterogeneity(&mut self, label: &ModelLabel) {
        use ParameterGroup::SiteHeterogeneity;
        let heterogeneity = label.heterogeneity();

        if heterogeneity.has_gamma() {
            self.free_scaled(
                SiteHeterogeneity,
                "alpha",
                0.1,
                PriorDistribution::Exponential { mean: 0.5 },
            );
        }
        if heterogeneity.has_invariant() {
            self.free_scaled(SiteHeterogeneity, "pInv", 0.1, UNIT_INTERVAL);
        }
    }

    fn add_clock(&mut self, clock: ClockFlavour, num_taxa: usize) {
        use ParameterGroup::Clock;

        match clock {
            ClockFlavour::Strict => {
                self.declare(Clock, ParameterRole::Fixed, "clock.rate");
                self.log(Clock, "parameter", "clock.rate");
            }
            ClockFlavour::Ucln | ClockFlavour::Uced => {
                let mean = clock.rate_parameter();
                self.free_scaled(Clock, mean, 5.0, IMPROPER_RATE);
                if clock == ClockFlavour::Ucln {
                    self.free_scaled(
                        Clock,
                        "ucld.stdev",
                        5.0,
                        PriorDistribution::Exponential {
                            mean: 0.3333333333333333,
                        },
                    );
                }

                self.declare(Clock, ParameterRole::Latent, "branchRates.categories");
                self.operate(
                    Clock,
                    OperatorKind::Swap { size: 1 },
                    num_taxa as f64,
                    "branchRates.categories",
                );
                self.operate(
                    Clock,
                    OperatorKind::UniformInteger,
                    10.0,
                    "branchRates.categories",
                );
                self.operate(Clock, up_down(), 5.0, mean);
            }
            ClockFlavour::RandLocal => {
                self.free_scaled(Clock, "clock.rate", 5.0, IMPROPER_RATE);

                self.declare(Clock, ParameterRole::Free, "localClock.relativeRates");
                self.operate(
                    Clock,
                    OperatorKind::Scale,
                    15.0,
                    "localClock.relativeRates",
                );
                self.prior(
                    Clock,
                    PriorDistribution::Gamma {
                        shape: 0.5,
                        scale: 2.0,
                    },
                    "localClock.relativeRates",
                );

                self.declare(Clock, ParameterRole::Latent, "localClock.changes");
                self.operate(Clock, OperatorKind::BitFlip, 15.0, "localClock.changes");
                self.declare(Clock, ParameterRole::Statistic, "rateChanges");
                self.priors.push(PriorSpec {
                    group: Clock,
                    distribution: PriorDistribution::Poisson {
                        mean: std::f64::consts::LN_2,
                    },
                    target_tag: "statistic",
                    target: "rateChanges".to_string(),
                    constrains: Some("localClock.changes".to_string()),
                });
                self.log(Clock, "sumStatistic", "rateChanges");

                self.operate(Clock, up_down(), 5.0, "clock.rate");
            }
        }

        if clock.has_rate_statistics() {
            for statistic in RATE_STATISTICS {
                self.declare(Clock, ParameterRole::Statistic, statistic.id);
                self.log(Clock, statistic.element, statistic.id);
            }
        }
    }

    fn add_tree_prior(&mut self, tree_prior: TreePrior) {
        use ParameterGroup::TreePrior as Group;

        match tree_prior {
            TreePrior::BirthDeath => {
                self.free_scaled(
                    Group,
                    "birthDeath.BminusDRate",
                    3.0,
                    PriorDistribution::Uniform {
                        lower: 0.0,
                        upper: 100000.0,
                    },
                );
                self.free_scaled(Group, "birthDeath.DoverB", 3.0, UNIT_INTERVAL);
            }
            TreePrior::Yule => {
                self.free_scaled(Group, "yule.birthRate", 3.0, IMPROPER_RATE);
            }
            TreePrior::ConstantCoalescent => {
                self.free_scaled(Group, "constant.popSize", 3.0, PriorDistribution::OneOnX);
            }
            TreePrior::ExponentialCoalescent | TreePrior::LogisticCoalescent => {
                let prefix = tree_prior.model_id();
                self.free_scaled(
                    Group,
                    &format!("{prefix}.popSize"),
                    3.0,
                    PriorDistribution::OneOnX,
                );

                let growth_rate = format!("{prefix}.growthRate");
                let scale = if tree_prior == TreePrior::ExponentialCoalescent {
                    30.701134573253945
                } else {
                    23.025850929940457
                };
                self.declare(Group, ParameterRole::Free, growth_rate.as_str());
                for absorbing in [false, true] {
                    self.operate(
                        Group,
                        OperatorKind::RandomWalk {
                            window: 1.0,
                            absorbing,
                        },
                        3.0,
                        &growth_rate,
                    );
                }
                self.prior(
                    Group,
                    PriorDistribution::Laplace { mean: 0.0, scale },
                    &growth_rate,
                );
                self.log(Group, "parameter", &growth_rate);

                if tree_prior == TreePrior::LogisticCoalescent {
                    self.free_scaled(
                        Group,
                        "logistic.t50",
                        3.0,
                        PriorDistribution::Gamma {
                            shape: 0.001,
                            scale: 1000.0,
                        },
                    );
                }
            }
        }
    }

    fn add_tree(&mut self, settings: &AnalysisSettings) {
        use ParameterGroup::Tree;

        self.declare(Tree, ParameterRole::TreeState, ROOT_HEIGHT);
        self.operate(Tree, OperatorKind::Scale, 5.0, ROOT_HEIGHT);
        self.log(Tree, "parameter", ROOT_HEIGHT);
        self.declare(Tree, ParameterRole::TreeState, INTERNAL_NODE_HEIGHTS);
        self.operate(Tree, OperatorKind::Uniform, 30.0, INTERNAL_NODE_HEIGHTS);
        self.declare(Tree, ParameterRole::TreeState, ALL_INTERNAL_NODE_HEIGHTS);

        if let Some(root_prior) = settings.root_prior() {
            let distribution = match root_prior.flavour {
                RootPriorFlavour::Uniform => PriorDistribution::Uniform {
                    lower: root_prior.first,
                    upper: root_prior.second,
                },
                RootPriorFlavour::Normal => PriorDistribution::Normal {
                    mean: root_prior.first,
                    stdev: root_prior.second,
                },
            };
            self.prior(Tree, distribution, ROOT_HEIGHT);
        }

        if settings.manipulates_topology() {
            for (kind, weight) in [
                (OperatorKind::SubtreeSlide { size: 0.02 }, 15.0),
                (OperatorKind::NarrowExchange, 15.0),
                (OperatorKind::WideExchange, 3.0),
                (OperatorKind::WilsonBalding, 3.0),
            ] {
                self.operate(Tree, kind, weight, TREE_MODEL);
            }
        }
    }
}

/// Identifier of the tree model.
pub const TREE_MODEL: &str = "treeModel";
pub const ROOT_HEIGHT: &str = "treeModel.rootHeight";
pub const INTERNAL_NODE_HEIGHTS: &str = "treeModel.internalNodeHeights";
pub const ALL_INTERNAL_NODE_HEIGHTS: &str = "treeModel.allInternalNodeHeights";

/// A branch-rate summary statistic of the relaxed and local clocks.
#[derive(Debug, Clone, Copy)]
pub struct RateStatistic {
    pub element: &'static str,
    pub id: &'static str,
    /// Summary mode over internal and external branches; `None` for the covariance.
    pub mode: Option<&'static str>,
}

pub const RATE_STATISTICS: [RateStatistic; 3] = [
    RateStatistic {
        element: "rateStatistic",
        id: "meanRate",
        mode: Some("mean"),
    },
    RateStatistic {
        element: "rateStatistic",
        id: "coefficientOfVariation",
        mode: Some("coefficientOfVariation"),
    },
    RateStatistic {
        element: "rateCovarianceStatistic",
        id: "covariance",
        mode: None,
    },
];

const UNIT_INTERVAL: PriorDistribution = PriorDistribution::Uniform {
    lower: 0.0,
    upper: 1.0,
};

const IMPROPER_RATE: PriorDistribution = PriorDistribution::Uniform {
    lower: 0.0,
    upper: 1.0E100,
};

fn up_down() -> OperatorKind {
    OperatorKind::UpDown {
        down: ALL_INTERNAL_NODE_HEIGHTS.to_string(),
    }
}
