//! Chain sections: operators, MCMC wiring, loggers and tail.

use crate::document::SectionKind;
use crate::document::assembler::Composer;
use crate::document::catalogue::{
    OperatorKind, OperatorSpec, ParameterGroup, PriorDistribution, PriorSpec, ROOT_HEIGHT,
    SCALE_FACTOR, TREE_MODEL,
};
use crate::document::sections::BRANCH_RATES;
use crate::xml::format_real;

/// Order in which operator groups are emitted.
const OPERATOR_ORDER: [ParameterGroup; 5] = [
    ParameterGroup::Substitution,
    ParameterGroup::SiteHeterogeneity,
    ParameterGroup::Clock,
    ParameterGroup::TreePrior,
    ParameterGroup::Tree,
];

impl Composer<'_> {
    pub(super) fn operators(&mut self) -> &mut Self {
        let catalogue = self.catalogue;

        self.banner("DEFINE OPERATORS");
        self.xml.open("operators", &[("id", "operators")]);
        for group in OPERATOR_ORDER {
            for operator in catalogue.operators_in(group) {
                self.operator(operator);
            }
        }
        self.xml.close("operators").blank();
        self.finish(SectionKind::Operators)
    }

    /// Opens the chain and writes the posterior: prior block, likelihood and
    /// the operator reference. The chain is closed by [Composer::tree_logs].
    pub(super) fn mcmc(&mut self) -> &mut Self {
        let catalogue = self.catalogue;
        let tree_prior = self.combination.tree_prior;
        let chain_length = self.settings.mcmc_length().to_string();

        self.banner("MCMC PARAMETERS");
        self.xml
            .open(
                "mcmc",
                &[
                    ("id", "mcmc"),
                    ("chainLength", &chain_length),
                    ("autoOptimize", "true"),
                ],
            )
            .open("posterior", &[("id", "posterior")])
            .open("prior", &[("id", "prior")]);

        for prior in catalogue.priors_in(ParameterGroup::TreePrior) {
            self.prior(prior);
        }
        self.xml
            .idref(tree_prior.likelihood_tag(), tree_prior.likelihood_id());
        for group in [
            ParameterGroup::Clock,
            ParameterGroup::Tree,
            ParameterGroup::Substitution,
            ParameterGroup::SiteHeterogeneity,
        ] {
            for prior in catalogue.priors_in(group) {
                self.prior(prior);
            }
        }

        self.xml
            .close("prior")
            .open("likelihood", &[("id", "likelihood")])
            .idref("treeLikelihood", "treeLikelihood")
            .close("likelihood")
            .close("posterior")
            .idref("operators", "operators")
            .blank();
        self.finish(SectionKind::Mcmc)
    }

    pub(super) fn screen_log(&mut self) -> &mut Self {
        let every = self.settings.screen_sampling().to_string();

        self.banner("PRINT PARAMETERS TO SCREEN");
        self.xml
            .open("log", &[("id", "screenLog"), ("logEvery", &every)]);
        for (label, tag) in [
            ("Posterior", "posterior"),
            ("Prior", "prior"),
            ("Likelihood", "likelihood"),
        ] {
            self.xml
                .open("column", &[("label", label), ("dp", "4"), ("width", "12")])
                .idref(tag, tag)
                .close("column");
        }
        for (label, id) in [
            ("Root Height", ROOT_HEIGHT),
            ("Rate", self.combination.clock.rate_parameter()),
        ] {
            self.xml
                .open("column", &[("label", label), ("sf", "6"), ("width", "12")])
                .idref("parameter", id)
                .close("column");
        }
        self.xml.close("log").blank();
        self.finish(SectionKind::ScreenLog)
    }

    /// File log of every parameter and statistic of the combination.
    pub(super) fn parameter_log(&mut self) -> &mut Self {
        let catalogue = self.catalogue;
        let tree_prior = self.combination.tree_prior;
        let every = self.settings.parameter_sampling().to_string();
        let file_name = format!("{}.log", self.stem);

        self.banner("PRINT PARAMETERS TO FILE");
        self.xml
            .open(
                "log",
                &[
                    ("id", "fileLog"),
                    ("logEvery", &every),
                    ("fileName", &file_name),
                ],
            )
            .idref("posterior", "posterior")
            .idref("prior", "prior")
            .idref("likelihood", "likelihood");
        for group in [
            ParameterGroup::Tree,
            ParameterGroup::TreePrior,
            ParameterGroup::Substitution,
            ParameterGroup::SiteHeterogeneity,
            ParameterGroup::Clock,
        ] {
            for column in catalogue.log_columns_in(group) {
                self.xml.idref(column.tag, &column.id);
            }
        }
        self.xml
            .idref("treeLikelihood", "treeLikelihood")
            .idref(tree_prior.likelihood_tag(), tree_prior.likelihood_id())
            .close("log")
            .blank();
        self.finish(SectionKind::ParameterLog)
    }

    /// Tree logs, then the end of the chain.
    pub(super) fn tree_logs(&mut self) -> &mut Self {
        let every = self.settings.tree_sampling().to_string();
        let branch_rates = self.combination.clock.branch_rates_tag();
        let time_trees = format!("{}.time.trees", self.stem);

        self.banner("TREE LOG FILES");
        self.xml
            .open(
                "logTree",
                &[
                    ("id", "treeFileLog"),
                    ("logEvery", &every),
                    ("nexusFormat", "true"),
                    ("fileName", &time_trees),
                    ("sortTranslationTable", "true"),
                ],
            )
            .idref(TREE_MODEL, TREE_MODEL)
            .idref(branch_rates, BRANCH_RATES)
            .idref("posterior", "posterior")
            .close("logTree");

        if self.settings.logs_phylograms() {
            let subst_trees = format!("{}.subst.trees", self.stem);
            self.xml
                .open(
                    "logTree",
                    &[
                        ("id", "substTreeFileLog"),
                        ("logEvery", &every),
                        ("nexusFormat", "true"),
                        ("fileName", &subst_trees),
                        ("branchLengths", "substitutions"),
                    ],
                )
                .idref(TREE_MODEL, TREE_MODEL)
                .idref(branch_rates, BRANCH_RATES)
                .idref("posterior", "posterior")
                .close("logTree");
        }
        self.xml.close("mcmc").blank();
        self.finish(SectionKind::TreeLogs)
    }

    pub(super) fn tail(&mut self) -> &mut Self {
        self.xml
            .open("report", &[])
            .open("property", &[("name", "timer")])
            .idref("object", "mcmc")
            .close("property")
            .close("report")
            .blank()
            .close("beast");
        self.finish(SectionKind::Tail)
    }
}

// ============================================================================
// Little Helpers (private)
// ============================================================================
impl Composer<'_> {
    fn operator(&mut self, operator: &OperatorSpec) {
        let tag = operator.kind.tag();
        let weight = operator.weight.to_string();
        let scale_factor = format_real(SCALE_FACTOR);

        let attrs: Vec<(&str, String)> = match &operator.kind {
            OperatorKind::Scale | OperatorKind::UpDown { .. } => {
                vec![("scaleFactor", scale_factor)]
            }
            OperatorKind::DeltaExchange { delta } => vec![("delta", delta.to_string())],
            OperatorKind::Swap { size } => vec![("size", size.to_string())],
            OperatorKind::RandomWalk { window, .. } => vec![("windowSize", format_real(*window))],
            OperatorKind::SubtreeSlide { size } => vec![
                ("size", size.to_string()),
                ("gaussian", "true".to_string()),
            ],
            OperatorKind::UniformInteger
            | OperatorKind::Uniform
            | OperatorKind::BitFlip
            | OperatorKind::NarrowExchange
            | OperatorKind::WideExchange
            | OperatorKind::WilsonBalding => Vec::new(),
        };
        let mut attrs: Vec<(&str, &str)> = attrs
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        attrs.push(("weight", &weight));
        match operator.kind {
            OperatorKind::Swap { .. } => attrs.push(("autoOptimize", "false")),
            OperatorKind::RandomWalk { absorbing: true, .. } => {
                attrs.push(("boundaryCondition", "absorbing"))
            }
            _ => {}
        }

        self.xml.open(tag, &attrs);
        match &operator.kind {
            OperatorKind::UpDown { down } => {
                self.wrapped_idref("up", "parameter", &operator.target)
                    .wrapped_idref("down", "parameter", down);
            }
            _ => {
                self.xml.idref(operator.target_tag(), &operator.target);
            }
        }
        self.xml.close(tag);
    }

    fn prior(&mut self, prior: &PriorSpec) {
        let distribution = prior.distribution;
        let tag = distribution.tag();
        let offset = format_real(0.0);

        let attrs: Vec<(&str, String)> = match distribution {
            PriorDistribution::Uniform { lower, upper } => {
                vec![("lower", format_real(lower)), ("upper", format_real(upper))]
            }
            PriorDistribution::OneOnX => Vec::new(),
            PriorDistribution::Laplace { mean, scale } => {
                vec![("mean", format_real(mean)), ("scale", format_real(scale))]
            }
            PriorDistribution::Gamma { shape, scale } => vec![
                ("shape", format_real(shape)),
                ("scale", format_real(scale)),
                ("offset", offset),
            ],
            PriorDistribution::Exponential { mean } => {
                vec![("mean", format_real(mean)), ("offset", offset)]
            }
            PriorDistribution::LogNormal { mean, stdev } => vec![
                ("mean", format_real(mean)),
                ("stdev", format_real(stdev)),
                ("offset", offset),
                ("meanInRealSpace", "false".to_string()),
            ],
            PriorDistribution::Poisson { mean } => {
                vec![("mean", format_real(mean)), ("offset", offset)]
            }
            PriorDistribution::Normal { mean, stdev } => {
                vec![("mean", format_real(mean)), ("stdev", format_real(stdev))]
            }
        };
        let attrs: Vec<(&str, &str)> = attrs
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();

        self.xml
            .open(tag, &attrs)
            .idref(prior.target_tag, &prior.target)
            .close(tag);
    }
}
