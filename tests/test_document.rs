use beastgen::alignment::{AlignmentDataset, AlignmentReaderBuilder, StartingTreeSource, Taxon};
use beastgen::config::{AnalysisSettings, SettingsBuilder};
use beastgen::document::{
    DocumentAssembler, ParameterCatalogue, ParameterRole, ReferenceError, SectionKind,
};
use beastgen::model::{
    ClockFlavour, Combination, ModelLabel, RateHeterogeneity, SubstitutionModel, TreePrior,
};
use std::path::Path;

const STARTING_TREE: &str = "((t1:0.1,t2:0.1):0.2,(t3:0.15,t4:0.15):0.15);";

fn toy_dataset() -> AlignmentDataset {
    AlignmentDataset::new(
        "runs/toy",
        vec![
            Taxon::new("t1", "ACGTACGTAC"),
            Taxon::new("t2", "ACGTACGTAA"),
            Taxon::new("t3", "ACGAACGTAC"),
            Taxon::new("t4", "TCGTACGTAC"),
        ],
    )
}

fn combination(label: &str, clock: ClockFlavour, tree_prior: TreePrior) -> Combination {
    Combination::new(ModelLabel::decompose(label), clock, tree_prior)
}

fn count(text: &str, pattern: &str) -> usize {
    text.matches(pattern).count()
}

#[test]
fn test_every_combination_passes_reference_check() {
    let settings = SettingsBuilder::new()
        .with_root_prior(["unif", "0.1", "10"])
        .unwrap()
        .log_phylograms()
        .build()
        .unwrap();
    let with_tree = toy_dataset().with_starting_tree(STARTING_TREE);
    let without_tree = toy_dataset();

    for dataset in [&with_tree, &without_tree] {
        let assembler = DocumentAssembler::new(&settings, dataset);
        for model in SubstitutionModel::ALL {
            for heterogeneity in RateHeterogeneity::ALL {
                for clock in ClockFlavour::ALL {
                    for tree_prior in TreePrior::ALL {
                        let combination =
                            Combination::new(ModelLabel::new(model, heterogeneity), clock, tree_prior);
                        let document = assembler.assemble(&combination);

                        let result = document.check_references();
                        if let Err(e) = &result {
                            eprintln!(
                                "{} / {clock} / {tree_prior} (starting tree: {}): {e}",
                                combination.model,
                                dataset.has_starting_tree()
                            );
                        }
                        assert!(result.is_ok());

                        let kinds: Vec<SectionKind> =
                            document.sections().iter().map(|s| s.kind).collect();
                        assert_eq!(kinds, SectionKind::ALL.to_vec());

                        let declared = document.declared_ids();
                        assert_eq!(
                            declared.iter().filter(|id| **id == "startingTree").count(),
                            1
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_document_is_well_nested() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("GTR+IG", ClockFlavour::RandLocal, TreePrior::LogisticCoalescent));
    let text = document.to_string();

    assert!(text.starts_with("<?xml version=\"1.0\" standalone=\"yes\"?>\n"));
    assert!(text.trim_end().ends_with("</beast>"));
    assert_eq!(count(&text, "<mcmc "), 1);
    assert_eq!(count(&text, "</mcmc>"), 1);
    assert!(text.find("</mcmc>").unwrap() > text.find("<logTree").unwrap());
    assert!(text.find("<report>").unwrap() > text.find("</mcmc>").unwrap());
}

#[test]
fn test_taxon_order_is_shared_by_taxa_and_alignment() {
    let settings = AnalysisSettings::default();
    let dataset = AlignmentReaderBuilder::for_file(
        Path::new("tests").join("fixtures").join("interleaved_n3.nex"),
    )
    .with_starting_tree(StartingTreeSource::None)
    .read()
    .unwrap();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("JC", ClockFlavour::Strict, TreePrior::Yule));

    let taxa: Vec<&str> = document
        .section(SectionKind::TaxonList)
        .unwrap()
        .declared()
        .skip(1)
        .collect();
    let sequences: Vec<&str> = document
        .section(SectionKind::Alignment)
        .unwrap()
        .referenced()
        .collect();
    assert_eq!(taxa, vec!["alpha", "beta", "gamma"]);
    assert_eq!(sequences, taxa);

    let alignment = &document.section(SectionKind::Alignment).unwrap().text;
    assert!(alignment.contains("ACGTAAGTACGA"));
    assert!(alignment.contains("numTaxa = 3 numChar = 12"));
}

#[test]
fn test_hky_gamma_strict_yule() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("HKY+G", ClockFlavour::Strict, TreePrior::Yule));
    assert!(document.check_references().is_ok());
    let text = document.to_string();

    assert_eq!(count(&text, "<hkyModel id=\"HKY\">"), 1);
    assert!(text.contains("<parameter id=\"HKY.kappa\" value=\"1.0\" lower=\"1.0E-8\" upper=\"100.0\"/>"));
    assert!(text.contains("<parameter id=\"alpha\" value=\"0.5\" lower=\"0.0\" upper=\"1000.0\"/>"));
    assert!(text.contains("<gammaShape gammaCategories=\"4\">"));
    assert!(text.contains("<yuleModel id=\"yule\" units=\"substitutions\">"));
    assert!(text.contains("<coalescentTree id=\"startingTree\" rootHeight=\"0.3\">"));
    assert!(text.contains("<strictClockBranchRates id=\"branchRates\">"));
    assert!(!text.contains("pInv"));
    assert!(!text.contains("rateStatistic"));
    assert!(!text.contains("deltaExchange"));

    let operators = &document.section(SectionKind::Operators).unwrap().text;
    for tag in ["<subtreeSlide", "<narrowExchange", "<wideExchange", "<wilsonBalding"] {
        assert_eq!(count(operators, tag), 1, "{tag}");
    }
    assert!(operators.contains("<parameter idref=\"HKY.kappa\"/>"));
    assert!(operators.contains("<parameter idref=\"yule.birthRate\"/>"));
    assert!(!operators.contains("clock.rate"));

    let mcmc = &document.section(SectionKind::Mcmc).unwrap().text;
    assert!(mcmc.contains("chainLength=\"20000000\""));
    assert!(mcmc.contains("<logNormalPrior mean=\"1.0\" stdev=\"1.25\" offset=\"0.0\" meanInRealSpace=\"false\">"));
    assert!(mcmc.contains("<exponentialPrior mean=\"0.5\" offset=\"0.0\">"));
    assert!(mcmc.contains("<speciationLikelihood idref=\"speciation\"/>"));

    let log = &document.section(SectionKind::ParameterLog).unwrap().text;
    assert!(log.contains("fileName=\"toy_analyze-HKY+G_est-top_yule-prior_strict-clock.log\""));
}

#[test]
fn test_starting_tree_from_dataset() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset().with_starting_tree(STARTING_TREE);
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("JC", ClockFlavour::Ucln, TreePrior::BirthDeath));
    let text = document.to_string();

    assert!(text.contains("<newick id=\"startingTree\" units=\"years\">"));
    assert!(text.contains(STARTING_TREE));
    assert!(!text.contains("coalescentTree"));
    assert!(!text.contains("initialDemo"));
    assert!(text.contains("<tree idref=\"startingTree\"/>"));
}

#[test]
fn test_relaxed_clock_statistics_and_swap_weight() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("GTR", ClockFlavour::Ucln, TreePrior::BirthDeath));
    assert!(document.check_references().is_ok());
    let text = document.to_string();

    assert!(text.contains("<parameter id=\"branchRates.categories\" dimension=\"6\"/>"));
    assert!(text.contains("<swapOperator size=\"1\" weight=\"4\" autoOptimize=\"false\">"));
    assert!(text.contains("<rateStatistic id=\"meanRate\" name=\"meanRate\" mode=\"mean\" internal=\"true\" external=\"true\">"));
    assert!(text.contains("<rateStatistic id=\"coefficientOfVariation\" name=\"coefficientOfVariation\" mode=\"coefficientOfVariation\" internal=\"true\" external=\"true\">"));
    assert!(text.contains("<rateCovarianceStatistic id=\"covariance\" name=\"covariance\">"));
    assert!(!text.contains("<rateCovarianceStatistic id=\"covariance\" name=\"covariance\" mode="));
    assert!(text.contains("<deltaExchange delta=\"0.01\" weight=\"0.1\">"));
    assert!(text.contains("<upDownOperator scaleFactor=\"0.75\" weight=\"5\">"));

    let screen = &document.section(SectionKind::ScreenLog).unwrap().text;
    assert!(screen.contains("<parameter idref=\"ucld.mean\"/>"));
}

#[test]
fn test_random_local_clock() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("K80", ClockFlavour::RandLocal, TreePrior::ConstantCoalescent));
    assert!(document.check_references().is_ok());
    let text = document.to_string();

    assert!(text.contains("<randomLocalClockModel id=\"branchRates\" ratesAreMultipliers=\"false\">"));
    assert!(text.contains("<bitFlipOperator weight=\"15\">"));
    assert!(text.contains("<statistic idref=\"rateChanges\"/>"));
    assert!(text.contains("<sumStatistic idref=\"rateChanges\"/>"));
    assert!(text.contains("<coalescentLikelihood id=\"coalescent\">"));
    assert!(text.contains("<oneOnXPrior>"));
}

#[test]
fn test_free_parameters_are_operated_constrained_and_logged() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset();
    let assembler = DocumentAssembler::new(&settings, &dataset);

    for label in ["TrN+IG", "K3Puf+G", "TVM", "SYM+I"] {
        for clock in ClockFlavour::ALL {
            for tree_prior in TreePrior::ALL {
                let model = ModelLabel::decompose(label);
                let catalogue =
                    ParameterCatalogue::new(&model, clock, tree_prior, &settings, dataset.num_taxa());
                let document = assembler.assemble(&Combination::new(model, clock, tree_prior));
                let operators = &document.section(SectionKind::Operators).unwrap().text;
                let mcmc = &document.section(SectionKind::Mcmc).unwrap().text;
                let log = &document.section(SectionKind::ParameterLog).unwrap().text;

                for parameter in catalogue.parameters() {
                    if parameter.role != ParameterRole::Free {
                        continue;
                    }
                    let reference = format!("idref=\"{}\"", parameter.id);
                    assert!(operators.contains(&reference), "{label}: {}", parameter.id);
                    if parameter.id != "localClock.relativeRates" {
                        assert!(log.contains(&reference), "{label}: {}", parameter.id);
                    }
                    let constrained = catalogue
                        .priors()
                        .iter()
                        .any(|prior| prior.constrained_parameter() == parameter.id);
                    assert!(constrained, "{label}: {}", parameter.id);
                    assert!(mcmc.contains(&reference), "{label}: {}", parameter.id);
                }
            }
        }
    }
}

#[test]
fn test_tied_rates_reuse_one_parameter() {
    let settings = AnalysisSettings::default();
    let dataset = toy_dataset();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("TrN", ClockFlavour::Strict, TreePrior::Yule));
    let substitution = &document.section(SectionKind::SubstitutionModel).unwrap().text;

    assert_eq!(count(substitution, "id=\"TrN.transversion\""), 1);
    assert_eq!(count(substitution, "idref=\"TrN.transversion\""), 3);
    assert_eq!(count(substitution, "id=\"TrN.ag\""), 1);
    assert!(substitution.contains("<gtrModel id=\"TrN\">"));
}

#[test]
fn test_topology_flag_only_changes_operators() {
    let estimated = AnalysisSettings::default();
    let fixed = SettingsBuilder::new().fix_topology().build().unwrap();
    let dataset = toy_dataset();
    let combination = combination("GTR+G", ClockFlavour::Uced, TreePrior::ExponentialCoalescent);

    let a = DocumentAssembler::new(&estimated, &dataset).assemble_with_stem(&combination, "run");
    let b = DocumentAssembler::new(&fixed, &dataset).assemble_with_stem(&combination, "run");

    for (left, right) in a.sections().iter().zip(b.sections()) {
        if left.kind == SectionKind::Operators {
            assert_ne!(left.text, right.text);
            assert!(!right.text.contains("subtreeSlide"));
            assert!(!right.text.contains("wilsonBalding"));
        } else {
            assert_eq!(left.text, right.text, "{:?}", left.kind);
        }
    }
}

#[test]
fn test_root_prior() {
    let settings = SettingsBuilder::new()
        .with_root_prior(["norm", "10.0", "1.5"])
        .unwrap()
        .build()
        .unwrap();
    let dataset = toy_dataset();
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("JC", ClockFlavour::Strict, TreePrior::Yule));
    let mcmc = &document.section(SectionKind::Mcmc).unwrap().text;

    assert!(mcmc.contains("<normalPrior mean=\"10.0\" stdev=\"1.5\">"));
    assert!(mcmc.contains("<parameter idref=\"treeModel.rootHeight\"/>"));

    let log = &document.section(SectionKind::ParameterLog).unwrap().text;
    assert!(log.contains("toy_analyze-JC_est-top_yule-prior_norm-root_strict-clock.log"));
}

#[test]
fn test_phylogram_log() {
    let dataset = toy_dataset();
    let combination = combination("JC", ClockFlavour::Strict, TreePrior::Yule);

    let plain = AnalysisSettings::default();
    let document = DocumentAssembler::new(&plain, &dataset).assemble_with_stem(&combination, "run");
    let trees = &document.section(SectionKind::TreeLogs).unwrap().text;
    assert!(trees.contains("fileName=\"run.time.trees\""));
    assert!(!trees.contains("subst.trees"));

    let with_phylograms = SettingsBuilder::new().log_phylograms().build().unwrap();
    let document =
        DocumentAssembler::new(&with_phylograms, &dataset).assemble_with_stem(&combination, "run");
    let trees = &document.section(SectionKind::TreeLogs).unwrap().text;
    assert!(trees.contains("fileName=\"run.subst.trees\""));
    assert!(trees.contains("branchLengths=\"substitutions\""));
    assert!(document.check_references().is_ok());
}

#[test]
fn test_unknown_model_document_is_consistent() {
    let settings = SettingsBuilder::new()
        .with_sub_models(["F81+G"])
        .allow_unrecognized_models()
        .build()
        .unwrap();
    let dataset = toy_dataset();
    let assembler = DocumentAssembler::new(&settings, &dataset);

    for combination in settings.combinations() {
        let document = assembler.assemble(&combination);
        assert!(document.check_references().is_ok());
        assert!(document.section(SectionKind::SubstitutionModel).unwrap().text.is_empty());
        let site = &document.section(SectionKind::SiteModel).unwrap().text;
        assert!(!site.contains("substitutionModel"));
        assert!(site.contains("id=\"alpha\""));
    }
}

#[test]
fn test_label_round_trip() {
    for model in SubstitutionModel::ALL {
        for heterogeneity in RateHeterogeneity::ALL {
            let label = ModelLabel::new(model, heterogeneity);
            let decomposed = ModelLabel::decompose(label.text());
            assert_eq!(decomposed, label);
            assert_eq!(label.text().parse::<ModelLabel>().unwrap(), label);
        }
    }
}

#[test]
fn test_duplicate_taxon_names_are_reported() {
    let settings = AnalysisSettings::default();
    let dataset = AlignmentDataset::new(
        "dup",
        vec![
            Taxon::new("A", "ACGT"),
            Taxon::new("B", "ACGA"),
            Taxon::new("A", "ACTT"),
        ],
    );
    let document = DocumentAssembler::new(&settings, &dataset)
        .assemble(&combination("JC", ClockFlavour::Strict, TreePrior::Yule));
    assert_eq!(
        document.check_references(),
        Err(ReferenceError::Duplicate {
            id: "A".to_string(),
            section: SectionKind::TaxonList
        })
    );
}
