//! Output file naming and collision policy.
//!
//! Every document is written next to its alignment under a name that spells
//! out the combination it was assembled for:
//!
//! `{root}_analyze-{model}_{est-top|fix-top}_{prior}-prior[_{unif|norm}-root]_{clock}-clock.xml`
//!
//! The [OutputNamer] hands out each path at most once per run and refuses to
//! replace existing files unless overwriting was requested.

use crate::alignment::AlignmentDataset;
use crate::config::AnalysisSettings;
use crate::model::Combination;
use log::warn;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Extension of generated documents.
pub const OUTPUT_EXTENSION: &str = "xml";

/// Why an output path cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("Output file '{0}' already exists (use -overwrite to replace it).")]
    Exists(PathBuf),

    #[error("Output file '{0}' is produced twice in this run.")]
    DuplicateInRun(PathBuf),
}

/// File stem describing `combination` for the dataset with root name `root_name`.
///
/// # Example
/// ```
/// use beastgen::config::SettingsBuilder;
/// use beastgen::model::{ClockFlavour, Combination, ModelLabel, TreePrior};
/// use beastgen::output::output_stem;
///
/// let settings = SettingsBuilder::new()
///     .with_root_prior(["norm", "10.0", "1.5"])?
///     .build()?;
/// let combination = Combination::new(
///     ModelLabel::decompose("GTR+G"),
///     ClockFlavour::Ucln,
///     TreePrior::BirthDeath,
/// );
/// assert_eq!(
///     output_stem("primates", &combination, &settings),
///     "primates_analyze-GTR+G_est-top_bd-prior_norm-root_ucln-clock"
/// );
/// # Ok::<(), beastgen::config::ConfigError>(())
/// ```
pub fn output_stem(root_name: &str, combination: &Combination, settings: &AnalysisSettings) -> String {
    let topology = if settings.manipulates_topology() {
        "est-top"
    } else {
        "fix-top"
    };
    let root_prior = settings
        .root_prior()
        .map(|prior| format!("_{}-root", prior.flavour.label()))
        .unwrap_or_default();

    format!(
        "{root_name}_analyze-{}_{topology}_{}-prior{root_prior}_{}-clock",
        combination.model, combination.tree_prior, combination.clock
    )
}

// =#========================================================================#=
// OUTPUT NAMER
// =#========================================================================#=
/// Derives output paths and serializes their collision checks.
///
/// Safe to share between worker threads: claiming a path is atomic with
/// respect to other claims through the same namer.
#[derive(Debug, Default)]
pub struct OutputNamer {
    overwrite: bool,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl OutputNamer {
    /// Creates a namer; with `overwrite` existing files may be replaced.
    pub fn new(overwrite: bool) -> Self {
        Self {
            overwrite,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(settings.overwrite())
    }

    /// Path of the document of `combination`, next to the dataset's alignment.
    pub fn path_for(
        &self,
        dataset: &AlignmentDataset,
        combination: &Combination,
        settings: &AnalysisSettings,
    ) -> PathBuf {
        let stem = output_stem(&dataset.root_name(), combination, settings);
        dataset
            .root()
            .with_file_name(format!("{stem}.{OUTPUT_EXTENSION}"))
    }

    /// Reserves `path` for this run.
    ///
    /// # Errors
    /// - [OutputError::DuplicateInRun] if the path was claimed before
    /// - [OutputError::Exists] if the file exists and overwriting is off
    pub fn claim(&self, path: PathBuf) -> Result<PathBuf, OutputError> {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if claimed.contains(&path) {
            return Err(OutputError::DuplicateInRun(path));
        }
        if path.exists() {
            if !self.overwrite {
                return Err(OutputError::Exists(path));
            }
            warn!("Overwriting '{}'", path.display());
        }
        claimed.insert(path.clone());
        Ok(path)
    }

    /// Number of paths claimed so far.
    pub fn num_claimed(&self) -> usize {
        self.claimed
            .lock()
            .map(|claimed| claimed.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsBuilder;
    use crate::model::{ClockFlavour, ModelLabel, TreePrior};

    #[test]
    fn test_stem_without_root_prior() {
        let settings = SettingsBuilder::new().fix_topology().build().unwrap();
        let combination = Combination::new(
            ModelLabel::decompose("JC"),
            ClockFlavour::Strict,
            TreePrior::LogisticCoalescent,
        );
        assert_eq!(
            output_stem("run", &combination, &settings),
            "run_analyze-JC_fix-top_logcoal-prior_strict-clock"
        );
    }

    #[test]
    fn test_second_claim_is_rejected() {
        let namer = OutputNamer::new(true);
        let path = PathBuf::from("no/such/dir/out.xml");
        assert!(namer.claim(path.clone()).is_ok());
        assert_eq!(namer.claim(path.clone()), Err(OutputError::DuplicateInRun(path)));
        assert_eq!(namer.num_claimed(), 1);
    }
}
