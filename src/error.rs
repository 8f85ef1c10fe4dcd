//! Crate-level errors and the fatal-error report.

use crate::config::ConfigError;
use crate::document::ReferenceError;
use crate::output::OutputError;
use crate::parser::ParsingError;
use std::path::PathBuf;
use thiserror::Error;

/// File in the working directory the last fatal error is reported to.
pub const ERROR_REPORT_FILE: &str = "Error.beastgen.txt";

/// First line of every fatal-error report.
pub const FAILURE_BANNER: &str = "beastgen failed.";

/// Usage lines appended to reports of a malformed root prior.
pub const ROOT_PRIOR_USAGE: [&str; 2] = [
    "'-rprior unif min_value max_value'",
    "'-rprior norm mean_value stdev_value'",
];

/// Everything that can stop a batch.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to read '{path}': {source}")]
    Parsing {
        path: PathBuf,
        #[source]
        source: ParsingError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("document '{path}' is inconsistent: {source}")]
    Reference {
        path: PathBuf,
        #[source]
        source: ReferenceError,
    },

    #[error("unable to write '{path}'.")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the error is a root prior with the wrong number of tokens.
    pub fn is_root_prior_arity(&self) -> bool {
        matches!(self, Error::Config(ConfigError::RootPriorArity(_)))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Text of a fatal-error report.
///
/// # Example
/// ```
/// use beastgen::error::fatal_report;
///
/// let report = fatal_report("clock flavour 'relaxed' not recognized.", false);
/// assert_eq!(report, "beastgen failed.\nError: clock flavour 'relaxed' not recognized.\n");
/// ```
pub fn fatal_report(cause: &str, with_root_prior_usage: bool) -> String {
    let mut report = format!("{FAILURE_BANNER}\nError: {cause}\n");
    if with_root_prior_usage {
        for line in ROOT_PRIOR_USAGE {
            report.push_str(line);
            report.push('\n');
        }
    }
    report
}
