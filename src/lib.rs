//! Beastgen is a batch generator of BEAST XML analysis files.
//!
//! For every alignment and every combination of substitution model, clock
//! flavour and tree prior it assembles one complete analysis document:
//! taxa, alignment, tree prior, tree model, clock model, substitution and
//! site model, operators, MCMC wiring and loggers.
//! Core functionality provided:
//! - Settings: candidate lists and chain settings, accumulated in a
//!   [SettingsBuilder](crate::config::SettingsBuilder) (directly or from a
//!   directive file) and frozen into [AnalysisSettings].
//! - Alignments: the matrix of a Nexus file (sequential or interleaved) is
//!   read into an [AlignmentDataset], together with an optional starting tree
//!   from a companion tree file.
//! - Documents: the [DocumentAssembler] derives all free parameters of a
//!   combination once ([ParameterCatalogue](crate::document::ParameterCatalogue))
//!   and writes sixteen sections in fixed order. Every document can be
//!   checked for forward references and duplicate identifiers before it is
//!   written.
//! - Output: descriptive file names and a collision policy
//!   ([OutputNamer](crate::output::OutputNamer)).
//!
//! Limitations:
//! - Only nucleotide data, one partition
//! - Only the substitution models JC, K80, HKY, TrNef, TrN, K3P, K3Puf,
//!   TIMef, TIM, TVMef, TVM, SYM and GTR (each optionally `+G`, `+I`, `+IG`)
//!
//! # Usage patterns
//! 1. [generate_documents] writes all documents for one dataset.
//! 2. Use [DocumentAssembler] directly to assemble documents in memory.
//!
//! ## Example
//! ```no_run
//! use beastgen::config::SettingsBuilder;
//! use beastgen::output::OutputNamer;
//! use beastgen::{generate_documents, read_alignment};
//!
//! let settings = SettingsBuilder::new()
//!     .with_sub_models(["HKY+G", "GTR+IG"])
//!     .with_clock_flavours(["strict", "ucln"])?
//!     .build()?;
//! let dataset = read_alignment("primates.nex")?;
//! let namer = OutputNamer::from_settings(&settings);
//!
//! let written = generate_documents(&settings, &dataset, &namer, false)?;
//! println!("Wrote {} documents", written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod alignment;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod xml;

pub use crate::alignment::AlignmentDataset;
pub use crate::config::AnalysisSettings;
pub use crate::document::DocumentAssembler;
pub use crate::error::{Error, Result};

use crate::output::OutputNamer;
use crate::parser::ParsingError;
use log::info;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

// ============================================================================
// Quick API
// ============================================================================
/// Reads an alignment with default settings (companion starting tree,
/// lenient character count).
///
/// See [`alignment::read_alignment`] for full documentation.
pub fn read_alignment<P: AsRef<Path>>(path: P) -> std::result::Result<AlignmentDataset, ParsingError> {
    alignment::read_alignment(path)
}

/// Assembles, checks and writes the documents of all combinations of
/// `settings` for one dataset, in parallel.
///
/// Every output path is claimed through `namer` before anything is written.
/// With `dry_run`, documents are assembled and checked but not written.
///
/// # Returns
/// The output paths, in combination order (models, then clocks, then tree priors)
///
/// # Errors
/// - [Error::Output] if an output path exists or is produced twice
/// - [Error::Reference] if a document fails its reference check
/// - [Error::Io] if a document cannot be written
pub fn generate_documents(
    settings: &AnalysisSettings,
    dataset: &AlignmentDataset,
    namer: &OutputNamer,
    dry_run: bool,
) -> Result<Vec<PathBuf>> {
    let assembler = DocumentAssembler::new(settings, dataset);

    settings
        .combinations()
        .par_iter()
        .map(|combination| {
            let path = namer.claim(namer.path_for(dataset, combination, settings))?;
            let document = assembler.assemble(combination);
            document
                .check_references()
                .map_err(|source| Error::Reference {
                    path: path.clone(),
                    source,
                })?;

            if !dry_run {
                document.write_to(&path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
                info!("Wrote '{}'", path.display());
            }
            Ok(path)
        })
        .collect()
}
