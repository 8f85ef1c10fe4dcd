//! The document assembler and the per-document composer its sections write into.

use crate::alignment::AlignmentDataset;
use crate::config::AnalysisSettings;
use crate::document::catalogue::ParameterCatalogue;
use crate::document::{AssembledDocument, Section, SectionKind};
use crate::model::Combination;
use crate::output;
use crate::xml::{XmlWriter, format_real};
use log::{debug, warn};

// =#========================================================================#=
// DOCUMENT ASSEMBLER
// =#========================================================================#=
/// Assembles one document per combination for a fixed dataset and settings.
///
/// The assembler holds only shared references and no state of its own, so
/// one instance can be used from several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAssembler<'a> {
    settings: &'a AnalysisSettings,
    dataset: &'a AlignmentDataset,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(settings: &'a AnalysisSettings, dataset: &'a AlignmentDataset) -> Self {
        Self { settings, dataset }
    }

    /// Assembles the document of `combination`, naming its log files after
    /// the output file [output::output_stem] derives.
    pub fn assemble(&self, combination: &Combination) -> AssembledDocument {
        let stem = output::output_stem(&self.dataset.root_name(), combination, self.settings);
        self.assemble_with_stem(combination, &stem)
    }

    /// Assembles the document of `combination` with log files named after `stem`.
    ///
    /// An unrecognized base model does not stop assembly: the document then
    /// declares no rate matrix, and no substitution parameters are operated
    /// on, constrained or logged.
    ///
    /// # Arguments
    /// * `combination` - Substitution model label, clock flavour and tree prior
    /// * `stem` - Stem of the parameter and tree log file names
    ///
    /// # Returns
    /// The sixteen sections, in emission order
    pub fn assemble_with_stem(&self, combination: &Combination, stem: &str) -> AssembledDocument {
        if combination.model.model().is_none() {
            warn!(
                "Substitution model '{}' not recognized; its document has no substitution model",
                combination.model
            );
        }

        let catalogue = ParameterCatalogue::new(
            &combination.model,
            combination.clock,
            combination.tree_prior,
            self.settings,
            self.dataset.num_taxa(),
        );

        let mut composer = Composer {
            settings: self.settings,
            dataset: self.dataset,
            combination,
            catalogue: &catalogue,
            stem,
            xml: XmlWriter::new(),
            sections: Vec::with_capacity(SectionKind::ALL.len()),
        };

        composer
            .header()
            .taxon_list()
            .alignment()
            .patterns()
            .tree_prior()
            .tree_model()
            .clock_model()
            .substitution_model()
            .site_model()
            .tree_likelihood()
            .operators()
            .mcmc()
            .screen_log()
            .parameter_log()
            .tree_logs()
            .tail();

        debug!(
            "Assembled {} / {} / {} for '{}'",
            combination.model,
            combination.clock,
            combination.tree_prior,
            self.dataset.root_name()
        );

        AssembledDocument::new(composer.sections)
    }
}

// =#========================================================================#=
// COMPOSER
// =#========================================================================#=
/// Mutable state of one assembly: the writer and the sections finished so far.
///
/// Every section method writes its elements and closes with [Composer::finish].
pub(super) struct Composer<'a> {
    pub(super) settings: &'a AnalysisSettings,
    pub(super) dataset: &'a AlignmentDataset,
    pub(super) combination: &'a Combination,
    pub(super) catalogue: &'a ParameterCatalogue,
    pub(super) stem: &'a str,
    pub(super) xml: XmlWriter,
    sections: Vec<Section>,
}

// ============================================================================
// Little Helpers (pub(super))
// ============================================================================
impl Composer<'_> {
    /// Moves everything written since the last section into a new section.
    pub(super) fn finish(&mut self, kind: SectionKind) -> &mut Self {
        let (text, events) = self.xml.take();
        self.sections.push(Section { kind, text, events });
        self
    }

    /// Writes `<wrapper><parameter id value [lower upper]/></wrapper>`.
    pub(super) fn parameter(
        &mut self,
        wrapper: &str,
        id: &str,
        value: f64,
        bounds: Option<(f64, f64)>,
    ) -> &mut Self {
        let value = format_real(value);
        match bounds {
            Some((lower, upper)) => {
                let lower = format_real(lower);
                let upper = format_real(upper);
                self.xml.wrap(
                    wrapper,
                    "parameter",
                    &[
                        ("id", id),
                        ("value", &value),
                        ("lower", &lower),
                        ("upper", &upper),
                    ],
                );
            }
            None => {
                self.xml
                    .wrap(wrapper, "parameter", &[("id", id), ("value", &value)]);
            }
        }
        self
    }

    /// Writes `<wrapper><tag idref="id"/></wrapper>`.
    pub(super) fn wrapped_idref(&mut self, wrapper: &str, tag: &str, id: &str) -> &mut Self {
        self.xml.open(wrapper, &[]).idref(tag, id).close(wrapper);
        self
    }

    /// Writes a top-level banner comment.
    pub(super) fn banner(&mut self, title: &str) -> &mut Self {
        self.xml.comment(&format!("*** {title} ***"));
        self
    }
}
