//! Analysis settings: what to combine and how to run the chains.
//!
//! Settings are accumulated in a [SettingsBuilder] (directly or from a
//! directive file, see [directives]) and frozen into an immutable
//! [AnalysisSettings] by [SettingsBuilder::build], which is then shared by
//! reference for every assembled document.
//!
//! # Example
//! ```
//! use beastgen::config::SettingsBuilder;
//! use beastgen::model::{ClockFlavour, TreePrior};
//!
//! let settings = SettingsBuilder::new()
//!     .with_sub_models(["HKY+G", "GTR"])
//!     .with_clock_flavours(["strict", "ucln"])?
//!     .with_tree_priors(["yule"])?
//!     .with_root_prior(["norm", "10.0", "1.5"])?
//!     .fix_topology()
//!     .build()?;
//!
//! assert_eq!(settings.num_sub_models(), 2);
//! assert_eq!(settings.clock_flavour(1), Some(ClockFlavour::Ucln));
//! assert_eq!(settings.tree_prior(0), Some(TreePrior::Yule));
//! assert_eq!(settings.combinations().len(), 4);
//! assert!(!settings.manipulates_topology());
//! # Ok::<(), beastgen::config::ConfigError>(())
//! ```

pub mod directives;

pub use directives::{Directives, apply_directives, read_alignment_list, read_directive_file};

use crate::model::{
    ClockFlavour, Combination, ModelLabel, RootPrior, RootPriorFlavour, TreePrior, UnknownLabel,
};
use log::debug;
use std::path::PathBuf;
use thiserror::Error;

/// Default candidate substitution models.
pub const DEFAULT_SUB_MODELS: [&str; 6] = ["JC", "HKY", "GTR", "JC+G", "HKY+G", "GTR+G"];
/// Default chain length.
pub const DEFAULT_MCMC_LENGTH: u64 = 20_000_000;
/// Default screen sampling interval.
pub const DEFAULT_SCREEN_SAMPLING: u64 = 500;
/// Default parameter sampling interval.
pub const DEFAULT_PARAMETER_SAMPLING: u64 = 1000;
/// Default tree sampling interval.
pub const DEFAULT_TREE_SAMPLING: u64 = 5000;

// =#========================================================================#=
// CONFIG ERROR
// =#========================================================================#=
/// Errors raised while assembling the analysis settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown clock flavour, tree prior, root-prior flavour or substitution model
    #[error(transparent)]
    Unrecognized(#[from] UnknownLabel),

    #[error("root prior expects a flavour and two values, got {0} value(s).")]
    RootPriorArity(usize),

    #[error("invalid root prior: {0}")]
    InvalidRootPrior(String),

    #[error("'{value}' is not a valid number for {what}.")]
    InvalidNumber { what: &'static str, value: String },

    #[error("'{value}' is not a valid positive integer for {what}.")]
    InvalidInteger { what: &'static str, value: String },

    #[error("empty list of {0}.")]
    EmptyList(&'static str),

    #[error("unknown directive '{directive}' on line {line}.")]
    UnknownDirective { line: usize, directive: String },

    #[error("directive '{directive}' on line {line} expects {expected}.")]
    DirectiveArity {
        line: usize,
        directive: String,
        expected: &'static str,
    },

    #[error("no alignment list given (directive '-alist').")]
    MissingAlignmentList,

    #[error("alignment list '{0}' names no alignment files.")]
    EmptyAlignmentList(PathBuf),

    #[error("unable to open file '{path}'.")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create an unreadable-file error
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }
}

/// Parses a strictly positive integer, e.g. a chain length or sampling interval.
///
/// # Errors
/// Returns [ConfigError::InvalidInteger] for malformed text or zero.
///
/// # Example
/// ```
/// use beastgen::config::parse_count;
///
/// assert_eq!(parse_count("mcmc length", "1000").unwrap(), 1000);
/// assert!(parse_count("mcmc length", "1e6").is_err());
/// assert!(parse_count("mcmc length", "0").is_err());
/// ```
pub fn parse_count(what: &'static str, text: &str) -> Result<u64, ConfigError> {
    match text.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidInteger {
            what,
            value: text.to_string(),
        }),
    }
}

/// Parses a floating-point value.
fn parse_real(what: &'static str, text: &str) -> Result<f64, ConfigError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            what,
            value: text.to_string(),
        })
}

// =#========================================================================#=
// SETTINGS BUILDER
// =#========================================================================#=
/// Accumulates analysis settings before they are frozen by [build()](SettingsBuilder::build).
///
/// Defaults:
/// - substitution models JC, HKY, GTR, JC+G, HKY+G, GTR+G
/// - clock flavour ucln, tree prior bd, no root prior
/// - chain length 20,000,000; sampling every 500 (screen), 1000 (parameters), 5000 (trees)
/// - topology estimated, no phylogram log, no overwriting
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    sub_models: Vec<String>,
    clock_flavours: Vec<ClockFlavour>,
    tree_priors: Vec<TreePrior>,
    root_prior: Option<RootPrior>,
    mcmc_length: u64,
    screen_sampling: u64,
    parameter_sampling: u64,
    tree_sampling: u64,
    manipulate_topology: bool,
    log_phylograms: bool,
    overwrite: bool,
    allow_unrecognized_models: bool,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            sub_models: DEFAULT_SUB_MODELS.iter().map(|s| s.to_string()).collect(),
            clock_flavours: vec![ClockFlavour::Ucln],
            tree_priors: vec![TreePrior::BirthDeath],
            root_prior: None,
            mcmc_length: DEFAULT_MCMC_LENGTH,
            screen_sampling: DEFAULT_SCREEN_SAMPLING,
            parameter_sampling: DEFAULT_PARAMETER_SAMPLING,
            tree_sampling: DEFAULT_TREE_SAMPLING,
            manipulate_topology: true,
            log_phylograms: false,
            overwrite: false,
            allow_unrecognized_models: false,
        }
    }
}

// ============================================================================
// Candidate lists (pub)
// ============================================================================
impl SettingsBuilder {
    /// Creates a builder holding the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the candidate substitution-model labels.
    ///
    /// Labels are free text here (`base[+suffix]`); they are checked
    /// against the known models in [build()](SettingsBuilder::build).
    pub fn with_sub_models<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sub_models = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Replaces the candidate clock flavours, validating each immediately.
    ///
    /// # Errors
    /// Returns [ConfigError::Unrecognized] for the first unknown flavour.
    pub fn with_clock_flavours<I, S>(mut self, values: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clock_flavours = values
            .into_iter()
            .map(|v| v.as_ref().parse::<ClockFlavour>())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Replaces the candidate tree priors, validating each immediately.
    ///
    /// # Errors
    /// Returns [ConfigError::Unrecognized] for the first unknown tree prior.
    pub fn with_tree_priors<I, S>(mut self, values: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tree_priors = values
            .into_iter()
            .map(|v| v.as_ref().parse::<TreePrior>())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Sets the root prior from its textual triple `flavour value value`.
    ///
    /// # Errors
    /// - [ConfigError::RootPriorArity] unless exactly 3 tokens are given
    /// - [ConfigError::Unrecognized] if the flavour is neither `unif` nor `norm`
    /// - [ConfigError::InvalidNumber] if a value is not a finite number
    /// - [ConfigError::InvalidRootPrior] if `min >= max` or `stdev <= 0`
    pub fn with_root_prior<I, S>(mut self, tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        let [flavour, first, second] = tokens.as_slice() else {
            return Err(ConfigError::RootPriorArity(tokens.len()));
        };

        let flavour = flavour.as_ref().parse::<RootPriorFlavour>()?;
        let first = parse_real("root prior", first.as_ref())?;
        let second = parse_real("root prior", second.as_ref())?;

        let prior = match flavour {
            RootPriorFlavour::Uniform if first >= second => {
                return Err(ConfigError::InvalidRootPrior(format!(
                    "minimum {first} is not below maximum {second}"
                )));
            }
            RootPriorFlavour::Normal if second <= 0.0 => {
                return Err(ConfigError::InvalidRootPrior(format!(
                    "standard deviation {second} is not positive"
                )));
            }
            RootPriorFlavour::Uniform => RootPrior::uniform(first, second),
            RootPriorFlavour::Normal => RootPrior::normal(first, second),
        };

        self.root_prior = Some(prior);
        Ok(self)
    }
}

// ============================================================================
// Scalars and flags (pub)
// ============================================================================
impl SettingsBuilder {
    pub fn with_mcmc_length(mut self, generations: u64) -> Self {
        self.mcmc_length = generations;
        self
    }

    pub fn with_screen_sampling(mut self, every: u64) -> Self {
        self.screen_sampling = every;
        self
    }

    pub fn with_parameter_sampling(mut self, every: u64) -> Self {
        self.parameter_sampling = every;
        self
    }

    pub fn with_tree_sampling(mut self, every: u64) -> Self {
        self.tree_sampling = every;
        self
    }

    /// Whether topology operators are emitted (default `true`).
    pub fn with_topology_manipulation(mut self, manipulate: bool) -> Self {
        self.manipulate_topology = manipulate;
        self
    }

    /// Keeps the topology of the starting tree fixed (no topology operators).
    pub fn fix_topology(self) -> Self {
        self.with_topology_manipulation(false)
    }

    /// Additionally logs substitution-scaled trees (phylograms).
    pub fn log_phylograms(mut self) -> Self {
        self.log_phylograms = true;
        self
    }

    /// Replaces existing output files instead of failing.
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Keeps substitution-model labels with an unknown base model; their
    /// documents then carry no substitution-model content.
    pub fn allow_unrecognized_models(mut self) -> Self {
        self.allow_unrecognized_models = true;
        self
    }

    /// Validates and freezes the settings.
    ///
    /// # Errors
    /// - [ConfigError::EmptyList] if any candidate list is empty
    /// - [ConfigError::Unrecognized] for a substitution-model label with an
    ///   unknown base, unless [allow_unrecognized_models()](SettingsBuilder::allow_unrecognized_models)
    /// - [ConfigError::InvalidInteger] if the chain length or an interval is zero
    pub fn build(self) -> Result<AnalysisSettings, ConfigError> {
        if self.sub_models.is_empty() {
            return Err(ConfigError::EmptyList("substitution models"));
        }
        if self.clock_flavours.is_empty() {
            return Err(ConfigError::EmptyList("clock flavours"));
        }
        if self.tree_priors.is_empty() {
            return Err(ConfigError::EmptyList("tree priors"));
        }

        for (what, value) in [
            ("mcmc length", self.mcmc_length),
            ("screen sampling", self.screen_sampling),
            ("parameter sampling", self.parameter_sampling),
            ("tree sampling", self.tree_sampling),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidInteger {
                    what,
                    value: value.to_string(),
                });
            }
        }

        let sub_models = self
            .sub_models
            .iter()
            .map(|text| -> Result<ModelLabel, ConfigError> {
                let label = ModelLabel::decompose(text);
                if !self.allow_unrecognized_models {
                    label.require_known()?;
                }
                Ok(label)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Settings: {} model(s), {} clock(s), {} tree prior(s)",
            sub_models.len(),
            self.clock_flavours.len(),
            self.tree_priors.len()
        );

        Ok(AnalysisSettings {
            sub_models,
            clock_flavours: self.clock_flavours,
            tree_priors: self.tree_priors,
            root_prior: self.root_prior,
            mcmc_length: self.mcmc_length,
            screen_sampling: self.screen_sampling,
            parameter_sampling: self.parameter_sampling,
            tree_sampling: self.tree_sampling,
            manipulate_topology: self.manipulate_topology,
            log_phylograms: self.log_phylograms,
            overwrite: self.overwrite,
        })
    }
}

// =#========================================================================#=
// ANALYSIS SETTINGS
// =#========================================================================#=
/// Validated, immutable analysis settings.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    sub_models: Vec<ModelLabel>,
    clock_flavours: Vec<ClockFlavour>,
    tree_priors: Vec<TreePrior>,
    root_prior: Option<RootPrior>,
    mcmc_length: u64,
    screen_sampling: u64,
    parameter_sampling: u64,
    tree_sampling: u64,
    manipulate_topology: bool,
    log_phylograms: bool,
    overwrite: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sub_models: DEFAULT_SUB_MODELS.iter().map(|s| ModelLabel::decompose(s)).collect(),
            clock_flavours: vec![ClockFlavour::Ucln],
            tree_priors: vec![TreePrior::BirthDeath],
            root_prior: None,
            mcmc_length: DEFAULT_MCMC_LENGTH,
            screen_sampling: DEFAULT_SCREEN_SAMPLING,
            parameter_sampling: DEFAULT_PARAMETER_SAMPLING,
            tree_sampling: DEFAULT_TREE_SAMPLING,
            manipulate_topology: true,
            log_phylograms: false,
            overwrite: false,
        }
    }
}

impl AnalysisSettings {
    pub fn sub_models(&self) -> &[ModelLabel] {
        &self.sub_models
    }

    pub fn num_sub_models(&self) -> usize {
        self.sub_models.len()
    }

    pub fn sub_model(&self, index: usize) -> Option<&ModelLabel> {
        self.sub_models.get(index)
    }

    pub fn clock_flavours(&self) -> &[ClockFlavour] {
        &self.clock_flavours
    }

    pub fn num_clock_flavours(&self) -> usize {
        self.clock_flavours.len()
    }

    pub fn clock_flavour(&self, index: usize) -> Option<ClockFlavour> {
        self.clock_flavours.get(index).copied()
    }

    pub fn tree_priors(&self) -> &[TreePrior] {
        &self.tree_priors
    }

    pub fn num_tree_priors(&self) -> usize {
        self.tree_priors.len()
    }

    pub fn tree_prior(&self, index: usize) -> Option<TreePrior> {
        self.tree_priors.get(index).copied()
    }

    pub fn root_prior(&self) -> Option<&RootPrior> {
        self.root_prior.as_ref()
    }

    pub fn mcmc_length(&self) -> u64 {
        self.mcmc_length
    }

    pub fn screen_sampling(&self) -> u64 {
        self.screen_sampling
    }

    pub fn parameter_sampling(&self) -> u64 {
        self.parameter_sampling
    }

    pub fn tree_sampling(&self) -> u64 {
        self.tree_sampling
    }

    /// Whether topology operators are part of the analysis.
    pub fn manipulates_topology(&self) -> bool {
        self.manipulate_topology
    }

    pub fn logs_phylograms(&self) -> bool {
        self.log_phylograms
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// All (model, clock, tree prior) combinations: models outermost, tree priors innermost.
    pub fn combinations(&self) -> Vec<Combination> {
        let mut combinations = Vec::with_capacity(
            self.sub_models.len() * self.clock_flavours.len() * self.tree_priors.len(),
        );
        for model in &self.sub_models {
            for clock in &self.clock_flavours {
                for tree_prior in &self.tree_priors {
                    combinations.push(Combination::new(model.clone(), *clock, *tree_prior));
                }
            }
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabelKind;

    #[test]
    fn test_defaults() {
        let settings = SettingsBuilder::new().build().unwrap();
        let labels: Vec<&str> = settings.sub_models().iter().map(|l| l.text()).collect();
        assert_eq!(labels, DEFAULT_SUB_MODELS);
        assert_eq!(settings.clock_flavours(), &[ClockFlavour::Ucln]);
        assert_eq!(settings.tree_priors(), &[TreePrior::BirthDeath]);
        assert_eq!(settings.mcmc_length(), 20_000_000);
        assert_eq!(settings.screen_sampling(), 500);
        assert_eq!(settings.parameter_sampling(), 1000);
        assert_eq!(settings.tree_sampling(), 5000);
        assert!(settings.manipulates_topology());
        assert!(!settings.logs_phylograms());
        assert!(!settings.overwrite());
        assert!(settings.root_prior().is_none());
    }

    #[test]
    fn test_unknown_clock_is_rejected() {
        let err = SettingsBuilder::new()
            .with_clock_flavours(["strict", "relaxed"])
            .unwrap_err();
        match err {
            ConfigError::Unrecognized(label) => {
                assert_eq!(label.kind, LabelKind::ClockFlavour);
                assert_eq!(label.value, "relaxed");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_root_prior_validation() {
        assert!(matches!(
            SettingsBuilder::new().with_root_prior(["unif", "1.0"]),
            Err(ConfigError::RootPriorArity(2))
        ));
        assert!(matches!(
            SettingsBuilder::new().with_root_prior(["gamma", "1.0", "2.0"]),
            Err(ConfigError::Unrecognized(_))
        ));
        assert!(matches!(
            SettingsBuilder::new().with_root_prior(["norm", "ten", "2.0"]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            SettingsBuilder::new().with_root_prior(["unif", "5", "2"]),
            Err(ConfigError::InvalidRootPrior(_))
        ));

        let settings = SettingsBuilder::new()
            .with_root_prior(["unif", "1", "2.5"])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(settings.root_prior(), Some(&RootPrior::uniform(1.0, 2.5)));
    }

    #[test]
    fn test_unknown_sub_model_policy() {
        let strict = SettingsBuilder::new().with_sub_models(["GTR", "F81"]).build();
        assert!(matches!(strict, Err(ConfigError::Unrecognized(_))));

        let lenient = SettingsBuilder::new()
            .with_sub_models(["GTR", "F81"])
            .allow_unrecognized_models()
            .build()
            .unwrap();
        assert_eq!(lenient.num_sub_models(), 2);
        assert!(lenient.sub_model(1).unwrap().model().is_none());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = SettingsBuilder::new().with_tree_sampling(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidInteger { .. })));
    }
}
