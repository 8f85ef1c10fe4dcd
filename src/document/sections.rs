//! Data and model sections: header through tree likelihood.

use crate::document::SectionKind;
use crate::document::assembler::Composer;
use crate::document::catalogue::{
    ALL_INTERNAL_NODE_HEIGHTS, INTERNAL_NODE_HEIGHTS, RATE_STATISTICS, ROOT_HEIGHT, TREE_MODEL,
};
use crate::model::substitution::RATE_PAIRS;
use crate::model::{ClockFlavour, RateSlot, RateStructure, TreePrior};
use crate::xml::format_real;

/// Identifier of the starting tree, whichever entity produces it.
pub(super) const STARTING_TREE: &str = "startingTree";

/// Identifier of the branch-rate entity of every clock flavour.
pub(super) const BRANCH_RATES: &str = "branchRates";

const INITIAL_DEMO: &str = "initialDemo";
const EQUAL_FREQUENCIES: &str = "0.25 0.25 0.25 0.25";
const RATE_BOUNDS: (f64, f64) = (1.0E-8, 100.0);
const POSITIVE: (f64, f64) = (0.0, f64::INFINITY);

impl Composer<'_> {
    pub(super) fn header(&mut self) -> &mut Self {
        let combination = self.combination;
        self.xml
            .raw(r#"<?xml version="1.0" standalone="yes"?>"#)
            .blank()
            .comment(&format!(
                "Generated by beastgen version {}",
                env!("CARGO_PKG_VERSION")
            ))
            .comment(&format!("Alignment: {}", self.dataset.root_name()))
            .comment(&format!(
                "Substitution model: {}, clock: {}, tree prior: {}",
                combination.model, combination.clock, combination.tree_prior
            ))
            .blank()
            .open("beast", &[])
            .blank();
        self.finish(SectionKind::Header)
    }

    pub(super) fn taxon_list(&mut self) -> &mut Self {
        self.banner("TAXON LIST");
        self.xml
            .comment(&format!("numTaxa = {}", self.dataset.num_taxa()))
            .open("taxa", &[("id", "taxa")]);
        for taxon in self.dataset.taxa() {
            self.xml.empty("taxon", &[("id", &taxon.name)]);
        }
        self.xml.close("taxa").blank();
        self.finish(SectionKind::TaxonList)
    }

    pub(super) fn alignment(&mut self) -> &mut Self {
        self.banner("NUCLEOTIDE ALIGNMENT (refers to taxa above)");
        self.xml
            .comment(&format!(
                "numTaxa = {} numChar = {}",
                self.dataset.num_taxa(),
                self.dataset.num_char()
            ))
            .open(
                "alignment",
                &[("id", "alignment"), ("dataType", "nucleotide")],
            );
        for taxon in self.dataset.taxa() {
            self.xml
                .open("sequence", &[])
                .idref("taxon", &taxon.name)
                .text(&taxon.sequence)
                .close("sequence");
        }
        self.xml.close("alignment").blank();
        self.finish(SectionKind::Alignment)
    }

    pub(super) fn patterns(&mut self) -> &mut Self {
        self.banner("DEFINE PARTITIONS");
        self.xml
            .open("patterns", &[("id", "patterns"), ("from", "1")])
            .idref("alignment", "alignment")
            .close("patterns")
            .blank();
        self.finish(SectionKind::Patterns)
    }

    /// Demographic or speciation model, then the entity producing the starting tree.
    pub(super) fn tree_prior(&mut self) -> &mut Self {
        let tree_prior = self.combination.tree_prior;
        let id = tree_prior.model_id();
        let tag = tree_prior.model_tag();

        self.banner("PRIOR ON NODE AGES");
        self.xml
            .comment(&format!(
                "A prior on the distribution node heights defined given {}",
                describe_tree_prior(tree_prior)
            ))
            .open(tag, &[("id", id), ("units", "substitutions")]);
        match tree_prior {
            TreePrior::BirthDeath => {
                self.parameter(
                    "birthMinusDeathRate",
                    "birthDeath.BminusDRate",
                    1.0,
                    Some(POSITIVE),
                )
                .parameter("relativeDeathRate", "birthDeath.DoverB", 0.5, Some((0.0, 1.0)));
            }
            TreePrior::Yule => {
                self.parameter("birthRate", "yule.birthRate", 1.0, Some(POSITIVE));
            }
            TreePrior::ConstantCoalescent => {
                self.parameter("populationSize", "constant.popSize", 0.3, Some(POSITIVE));
            }
            TreePrior::ExponentialCoalescent | TreePrior::LogisticCoalescent => {
                self.parameter("populationSize", &format!("{id}.popSize"), 0.3, Some(POSITIVE))
                    .parameter(
                        "growthRate",
                        &format!("{id}.growthRate"),
                        3.0E-4,
                        Some((f64::NEG_INFINITY, f64::INFINITY)),
                    );
                if tree_prior == TreePrior::LogisticCoalescent {
                    self.parameter("t50", "logistic.t50", 1.0, Some(POSITIVE));
                }
            }
        }
        self.xml.close(tag).blank();

        match self.dataset.starting_tree() {
            Some(tree) => {
                self.banner("STARTING TREE");
                self.xml
                    .open("newick", &[("id", STARTING_TREE), ("units", "years")])
                    .text(tree)
                    .close("newick");
            }
            None => self.random_starting_tree(tree_prior),
        }
        self.xml.blank();
        self.finish(SectionKind::TreePrior)
    }

    /// Tree model and the likelihood of the tree under its prior.
    pub(super) fn tree_model(&mut self) -> &mut Self {
        let tree_prior = self.combination.tree_prior;

        self.banner("CONSTRUCT TREE MODEL");
        self.xml
            .open(TREE_MODEL, &[("id", TREE_MODEL)])
            .idref("tree", STARTING_TREE)
            .wrap("rootHeight", "parameter", &[("id", ROOT_HEIGHT)])
            .open("nodeHeights", &[("internalNodes", "true")])
            .empty("parameter", &[("id", INTERNAL_NODE_HEIGHTS)])
            .close("nodeHeights")
            .open("nodeHeights", &[("internalNodes", "true"), ("rootNode", "true")])
            .empty("parameter", &[("id", ALL_INTERNAL_NODE_HEIGHTS)])
            .close("nodeHeights")
            .close(TREE_MODEL)
            .blank();

        let likelihood = tree_prior.likelihood_tag();
        let tree_wrapper = if tree_prior.is_speciation() {
            "speciesTree"
        } else {
            "populationTree"
        };
        self.xml
            .open(likelihood, &[("id", tree_prior.likelihood_id())]);
        self.wrapped_idref("model", tree_prior.model_tag(), tree_prior.model_id())
            .wrapped_idref(tree_wrapper, TREE_MODEL, TREE_MODEL);
        self.xml.close(likelihood).blank();
        self.finish(SectionKind::TreeModel)
    }

    pub(super) fn clock_model(&mut self) -> &mut Self {
        let clock = self.combination.clock;
        let tag = clock.branch_rates_tag();

        self.banner("DEFINE CLOCK MODEL");
        match clock {
            ClockFlavour::Strict => {
                self.xml
                    .comment("The strict clock (uniform rates across branches)")
                    .open(tag, &[("id", BRANCH_RATES)]);
                self.parameter("rate", "clock.rate", 1.0, None);
                self.xml.close(tag);
            }
            ClockFlavour::Ucln | ClockFlavour::Uced => {
                self.xml
                    .comment(
                        "The uncorrelated relaxed clock (Drummond, Ho, Phillips & Rambaut, 2006)",
                    )
                    .open(tag, &[("id", BRANCH_RATES)])
                    .idref(TREE_MODEL, TREE_MODEL)
                    .open("distribution", &[]);
                if clock == ClockFlavour::Ucln {
                    self.xml
                        .open("logNormalDistributionModel", &[("meanInRealSpace", "true")]);
                    self.parameter("mean", "ucld.mean", 0.001, Some((0.0, 10.0)))
                        .parameter("stdev", "ucld.stdev", 0.1, Some((0.0, 10.0)));
                    self.xml.close("logNormalDistributionModel");
                } else {
                    self.xml.open("exponentialDistributionModel", &[]);
                    self.parameter("mean", "uced.mean", 1.0, Some((0.0, 1000000.0)));
                    self.xml.close("exponentialDistributionModel");
                }
                let dimension = (2 * self.dataset.num_taxa()).saturating_sub(2).to_string();
                self.xml.close("distribution").wrap(
                    "rateCategories",
                    "parameter",
                    &[("id", "branchRates.categories"), ("dimension", &dimension)],
                );
                self.xml.close(tag);
            }
            ClockFlavour::RandLocal => {
                let rate = format_real(1.0);
                let lower = format_real(0.0);
                self.xml
                    .comment("The random local clock model (Drummond & Suchard, 2010)")
                    .open(
                        tag,
                        &[("id", BRANCH_RATES), ("ratesAreMultipliers", "false")],
                    )
                    .idref(TREE_MODEL, TREE_MODEL)
                    .wrap("rates", "parameter", &[("id", "localClock.relativeRates")])
                    .wrap("rateIndicator", "parameter", &[("id", "localClock.changes")])
                    .wrap(
                        "clockRate",
                        "parameter",
                        &[("id", "clock.rate"), ("value", &rate), ("lower", &lower)],
                    )
                    .close(tag)
                    .blank()
                    .open(
                        "sumStatistic",
                        &[
                            ("id", "rateChanges"),
                            ("name", "rateChangeCount"),
                            ("elementwise", "true"),
                        ],
                    )
                    .idref("parameter", "localClock.changes")
                    .close("sumStatistic");
            }
        }
        self.xml.blank();

        if clock.has_rate_statistics() {
            for statistic in RATE_STATISTICS {
                let mut attrs = vec![("id", statistic.id), ("name", statistic.id)];
                if let Some(mode) = statistic.mode {
                    attrs.extend([("mode", mode), ("internal", "true"), ("external", "true")]);
                }
                self.xml
                    .open(statistic.element, &attrs)
                    .idref(TREE_MODEL, TREE_MODEL)
                    .idref(tag, BRANCH_RATES)
                    .close(statistic.element)
                    .blank();
            }
        }
        self.finish(SectionKind::ClockModel)
    }

    /// The rate matrix of a known base model; nothing for an unrecognized one.
    pub(super) fn substitution_model(&mut self) -> &mut Self {
        let Some(model) = self.combination.model.model() else {
            return self.finish(SectionKind::SubstitutionModel);
        };
        let spec = model.spec();
        let tag = spec.element.tag();
        let frequencies = format!("{}.frequencies", spec.id);

        self.banner("DEFINE SUBSTITUTION MODEL");
        self.xml
            .comment(spec.description)
            .open(tag, &[("id", spec.id)])
            .open("frequencies", &[])
            .open("frequencyModel", &[("dataType", "nucleotide")])
            .wrap(
                "frequencies",
                "parameter",
                &[("id", &frequencies), ("value", EQUAL_FREQUENCIES)],
            )
            .close("frequencyModel")
            .close("frequencies");

        match &spec.rates {
            RateStructure::Kappa => {
                self.parameter("kappa", &format!("{}.kappa", spec.id), 1.0, Some(RATE_BOUNDS));
            }
            RateStructure::Pairwise(slots) => {
                for ((element, pair), slot) in RATE_PAIRS.iter().zip(slots) {
                    match slot {
                        RateSlot::Fixed => {
                            self.parameter(element, &format!("{}.{pair}", spec.id), 1.0, None)
                        }
                        RateSlot::Free(name) => self.parameter(
                            element,
                            &format!("{}.{name}", spec.id),
                            1.0,
                            Some(RATE_BOUNDS),
                        ),
                        RateSlot::Tied(name) => self.wrapped_idref(
                            element,
                            "parameter",
                            &format!("{}.{name}", spec.id),
                        ),
                    };
                }
            }
        }
        self.xml.close(tag).blank();
        self.finish(SectionKind::SubstitutionModel)
    }

    pub(super) fn site_model(&mut self) -> &mut Self {
        let heterogeneity = self.combination.model.heterogeneity();

        self.banner("DEFINE SITE MODEL");
        self.xml.open("siteModel", &[("id", "siteModel")]);
        if let Some(model) = self.combination.model.model() {
            let spec = model.spec();
            self.wrapped_idref("substitutionModel", spec.element.tag(), spec.id);
        }
        if heterogeneity.has_gamma() {
            let value = format_real(0.5);
            let lower = format_real(0.0);
            let upper = format_real(1000.0);
            self.xml
                .open("gammaShape", &[("gammaCategories", "4")])
                .empty(
                    "parameter",
                    &[
                        ("id", "alpha"),
                        ("value", &value),
                        ("lower", &lower),
                        ("upper", &upper),
                    ],
                )
                .close("gammaShape");
        }
        if heterogeneity.has_invariant() {
            self.parameter("proportionInvariant", "pInv", 0.25, Some((0.0, 1.0)));
        }
        self.xml.close("siteModel").blank();
        self.finish(SectionKind::SiteModel)
    }

    pub(super) fn tree_likelihood(&mut self) -> &mut Self {
        self.banner("DEFINE TREE LIKELIHOOD");
        self.xml
            .open("treeLikelihood", &[("id", "treeLikelihood")])
            .idref("patterns", "patterns")
            .idref(TREE_MODEL, TREE_MODEL)
            .idref("siteModel", "siteModel")
            .idref(self.combination.clock.branch_rates_tag(), BRANCH_RATES)
            .close("treeLikelihood")
            .blank();
        self.finish(SectionKind::TreeLikelihood)
    }
}

// ============================================================================
// Little Helpers (private)
// ============================================================================
impl Composer<'_> {
    /// Demographic seeding a random coalescent starting tree, and the tree itself.
    fn random_starting_tree(&mut self, tree_prior: TreePrior) {
        let (seed_tag, seed_id) = match tree_prior {
            TreePrior::BirthDeath | TreePrior::Yule => {
                self.xml
                    .comment("A constant population size coalescent model generating the initial tree")
                    .open(
                        "constantSize",
                        &[("id", INITIAL_DEMO), ("units", "substitutions")],
                    );
                self.parameter("populationSize", "initialDemo.popSize", 100.0, None);
                self.xml.close("constantSize").blank();
                ("constantSize", INITIAL_DEMO)
            }
            TreePrior::LogisticCoalescent => {
                self.xml.open(
                    "constantSize",
                    &[("id", INITIAL_DEMO), ("units", "substitutions")],
                );
                self.wrapped_idref("populationSize", "parameter", "logistic.popSize");
                self.xml.close("constantSize").blank();
                ("constantSize", INITIAL_DEMO)
            }
            TreePrior::ConstantCoalescent | TreePrior::ExponentialCoalescent => {
                (tree_prior.model_tag(), tree_prior.model_id())
            }
        };

        let root_height = format_real(0.3);
        self.xml
            .comment("Generate a random starting tree under the coalescent process")
            .open(
                "coalescentTree",
                &[("id", STARTING_TREE), ("rootHeight", &root_height)],
            )
            .idref("taxa", "taxa")
            .idref(seed_tag, seed_id)
            .close("coalescentTree");
    }
}

fn describe_tree_prior(tree_prior: TreePrior) -> &'static str {
    match tree_prior {
        TreePrior::BirthDeath => "a birth-death speciation process",
        TreePrior::Yule => "a Yule speciation process (a pure birth process)",
        TreePrior::ConstantCoalescent => "a constant-size coalescent process",
        TreePrior::ExponentialCoalescent => "an exponential-growth coalescent process",
        TreePrior::LogisticCoalescent => "a logistic-growth coalescent process",
    }
}
