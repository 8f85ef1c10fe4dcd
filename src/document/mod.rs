//! Assembly of analysis documents.
//!
//! A [DocumentAssembler] turns one (substitution model, clock flavour, tree
//! prior) combination, the [AnalysisSettings](crate::config::AnalysisSettings)
//! and an [AlignmentDataset](crate::alignment::AlignmentDataset) into an
//! [AssembledDocument]: the sixteen sections of a BEAST XML file in fixed
//! order. The free parameters of the combination, and the operators, priors
//! and log columns acting on them, come from one [ParameterCatalogue].
//!
//! Every section records the identifiers it declares and references, so the
//! finished document can be checked for forward or dangling references and
//! duplicate declarations before it is written.
//!
//! ```
//! use beastgen::alignment::{AlignmentDataset, Taxon};
//! use beastgen::config::SettingsBuilder;
//! use beastgen::document::{DocumentAssembler, SectionKind};
//!
//! let settings = SettingsBuilder::new().build()?;
//! let dataset = AlignmentDataset::new(
//!     "toy",
//!     vec![Taxon::new("A", "ACGT"), Taxon::new("B", "ACGA"), Taxon::new("C", "ACTT")],
//! );
//! let assembler = DocumentAssembler::new(&settings, &dataset);
//! for combination in settings.combinations() {
//!     let document = assembler.assemble(&combination);
//!     document.check_references()?;
//!     assert!(document.section(SectionKind::Operators).is_some());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod catalogue;
mod mcmc;
mod sections;

pub use assembler::DocumentAssembler;
pub use catalogue::{
    LogColumn, OperatorKind, OperatorSpec, Parameter, ParameterCatalogue, ParameterGroup,
    ParameterRole, PriorDistribution, PriorSpec,
};

use crate::xml::IdEvent;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// The sections of a document, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Header,
    TaxonList,
    Alignment,
    Patterns,
    TreePrior,
    TreeModel,
    ClockModel,
    SubstitutionModel,
    SiteModel,
    TreeLikelihood,
    Operators,
    Mcmc,
    ScreenLog,
    ParameterLog,
    TreeLogs,
    Tail,
}

impl SectionKind {
    pub const ALL: [SectionKind; 16] = [
        SectionKind::Header,
        SectionKind::TaxonList,
        SectionKind::Alignment,
        SectionKind::Patterns,
        SectionKind::TreePrior,
        SectionKind::TreeModel,
        SectionKind::ClockModel,
        SectionKind::SubstitutionModel,
        SectionKind::SiteModel,
        SectionKind::TreeLikelihood,
        SectionKind::Operators,
        SectionKind::Mcmc,
        SectionKind::ScreenLog,
        SectionKind::ParameterLog,
        SectionKind::TreeLogs,
        SectionKind::Tail,
    ];
}

/// Text of one section and the identifier events it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
    pub events: Vec<IdEvent>,
}

impl Section {
    /// Identifiers declared by this section, in order.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            IdEvent::Declare(id) => Some(id.as_str()),
            IdEvent::Reference(_) => None,
        })
    }

    /// Identifiers referenced by this section, in order.
    pub fn referenced(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            IdEvent::Reference(id) => Some(id.as_str()),
            IdEvent::Declare(_) => None,
        })
    }
}

/// Violation of the identifier graph of a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("'{id}' is referenced in the {section:?} section before it is declared")]
    Undeclared { id: String, section: SectionKind },

    #[error("'{id}' is declared twice (again in the {section:?} section)")]
    Duplicate { id: String, section: SectionKind },
}

// =#========================================================================#=
// ASSEMBLED DOCUMENT
// =#========================================================================#=
/// A complete document as an ordered list of sections.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    sections: Vec<Section>,
}

impl AssembledDocument {
    pub(crate) fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The section of the given kind, if it was emitted.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// All declared identifiers, in document order.
    pub fn declared_ids(&self) -> Vec<&str> {
        self.sections.iter().flat_map(Section::declared).collect()
    }

    /// Checks that every reference resolves to a declaration earlier in the
    /// document and that no identifier is declared twice.
    ///
    /// # Errors
    /// The first [ReferenceError] found, in document order.
    pub fn check_references(&self) -> Result<(), ReferenceError> {
        let mut declared: HashSet<&str> = HashSet::new();
        for section in &self.sections {
            for event in &section.events {
                match event {
                    IdEvent::Declare(id) => {
                        if !declared.insert(id.as_str()) {
                            return Err(ReferenceError::Duplicate {
                                id: id.clone(),
                                section: section.kind,
                            });
                        }
                    }
                    IdEvent::Reference(id) => {
                        if !declared.contains(id.as_str()) {
                            return Err(ReferenceError::Undeclared {
                                id: id.clone(),
                                section: section.kind,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes the full text to `path`, replacing any existing file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_string())
    }
}

impl fmt::Display for AssembledDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            f.write_str(&section.text)?;
        }
        Ok(())
    }
}
