use beastgen::config::{
    ConfigError, DEFAULT_MCMC_LENGTH, SettingsBuilder, apply_directives, read_alignment_list,
    read_directive_file,
};
use beastgen::model::{ClockFlavour, LabelKind, RateHeterogeneity, SubstitutionModel, TreePrior};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_directive_file() {
    let path = Path::new("tests").join("fixtures").join("directives.txt");
    let result = read_directive_file(&path);
    if let Err(e) = &result {
        eprintln!("Error reading directive file: {:?}", e);
    }
    assert!(result.is_ok());

    let directives = result.unwrap();
    assert_eq!(
        directives.alignment_list,
        Some(Path::new("tests").join("fixtures").join("alignments.txt"))
    );

    let settings = directives.settings.build().unwrap();
    assert_eq!(settings.num_sub_models(), 2);
    assert_eq!(settings.sub_model(0).unwrap().text(), "HKY+G");
    assert_eq!(
        settings.sub_model(0).unwrap().heterogeneity(),
        RateHeterogeneity::Gamma
    );
    assert_eq!(settings.sub_model(1).unwrap().model(), Some(SubstitutionModel::GTR));
    assert_eq!(
        settings.clock_flavours(),
        &[ClockFlavour::Strict, ClockFlavour::Ucln]
    );
    assert_eq!(settings.tree_priors(), &[TreePrior::Yule]);
    assert_eq!(settings.mcmc_length(), 100_000);
    assert_eq!(settings.screen_sampling(), 100);
    assert_eq!(settings.parameter_sampling(), 100);
    assert_eq!(settings.tree_sampling(), 1000);
    assert!(settings.root_prior().is_none());
    assert!(settings.manipulates_topology());
    assert_eq!(settings.combinations().len(), 4);
}

#[test]
fn test_alignment_list_is_resolved_against_its_directory() {
    let path = Path::new("tests").join("fixtures").join("alignments.txt");
    let alignments = read_alignment_list(&path).unwrap();
    assert_eq!(
        alignments,
        vec![
            Path::new("tests")
                .join("fixtures")
                .join("b_1_d_0.5_a_0.9_n_4_sim_JC_rep_1.nex"),
            Path::new("tests").join("fixtures").join("interleaved_n3.nex"),
        ]
    );
    assert!(alignments.iter().all(|path| path.is_file()));
}

#[test]
fn test_empty_alignment_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "# nothing to do\n\n").unwrap();

    let err = read_alignment_list(&path).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyAlignmentList(p) if p == path));
}

#[test]
fn test_missing_directive_file() {
    let err = read_directive_file("tests/fixtures/no_such_directives.txt").unwrap_err();
    assert!(matches!(err, ConfigError::Unreadable { .. }));
}

#[test]
fn test_defaults_survive_partial_directives() {
    let directives = apply_directives("-clock uced\n", SettingsBuilder::new()).unwrap();
    let settings = directives.settings.build().unwrap();
    assert_eq!(settings.mcmc_length(), DEFAULT_MCMC_LENGTH);
    assert_eq!(settings.num_sub_models(), 6);
    assert_eq!(settings.clock_flavours(), &[ClockFlavour::Uced]);
    assert_eq!(settings.tree_priors(), &[TreePrior::BirthDeath]);
}

#[test]
fn test_flags() {
    let text = "-logphy\n-fixtree\n-overwrite\n";
    let settings = apply_directives(text, SettingsBuilder::new())
        .unwrap()
        .settings
        .build()
        .unwrap();
    assert!(settings.logs_phylograms());
    assert!(!settings.manipulates_topology());
    assert!(settings.overwrite());
}

#[test]
fn test_root_prior_arity() {
    let err = apply_directives("-rprior norm 10\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(err, ConfigError::RootPriorArity(2)));

    let err = apply_directives("-rprior unif 1 2 3\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(err, ConfigError::RootPriorArity(4)));
}

#[test]
fn test_root_prior_values() {
    let settings = apply_directives("-rprior unif 10 20\n", SettingsBuilder::new())
        .unwrap()
        .settings
        .build()
        .unwrap();
    let prior = settings.root_prior().unwrap();
    assert_eq!(prior.first, 10.0);
    assert_eq!(prior.second, 20.0);

    let err = apply_directives("-rprior unif 20 10\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRootPrior(_)));

    let err = apply_directives("-rprior cauchy 0 1\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Unrecognized(ref label) if label.kind == LabelKind::RootPrior
    ));
}

#[test]
fn test_invalid_integer() {
    let err = apply_directives("-mcmc 1e6\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInteger { what: "mcmc length", .. }));

    let err = apply_directives("-tsamp\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(err, ConfigError::DirectiveArity { line: 1, .. }));
}

#[test]
fn test_unrecognized_labels() {
    let err = apply_directives("-clock relaxed\n", SettingsBuilder::new()).unwrap_err();
    assert_eq!(err.to_string(), "clock flavour 'relaxed' not recognized.");

    let err = apply_directives("# ok\n-tprior yule skyline\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Unrecognized(ref label) if label.value == "skyline"
    ));

    let err = apply_directives("-burnin 10\n", SettingsBuilder::new()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownDirective { line: 1, .. }));
}

#[test]
fn test_unknown_models_need_permission() {
    let builder = SettingsBuilder::new().with_sub_models(["F81+G", "HKY"]);
    let err = builder.clone().build().unwrap_err();
    assert_eq!(err.to_string(), "substitution model 'F81+G' not recognized.");

    let settings = builder.allow_unrecognized_models().build().unwrap();
    assert_eq!(settings.num_sub_models(), 2);
    assert!(settings.sub_model(0).unwrap().model().is_none());
}

#[test]
fn test_empty_candidate_list() {
    let err = SettingsBuilder::new()
        .with_sub_models(Vec::<String>::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EmptyList(_)));
}

#[test]
fn test_combination_order() {
    let settings = SettingsBuilder::new()
        .with_sub_models(["JC", "GTR"])
        .with_clock_flavours(["strict", "ucln"])
        .unwrap()
        .with_tree_priors(["yule", "bd"])
        .unwrap()
        .build()
        .unwrap();
    let combinations = settings.combinations();
    assert_eq!(combinations.len(), 8);
    assert_eq!(combinations[0].model.text(), "JC");
    assert_eq!(combinations[0].clock, ClockFlavour::Strict);
    assert_eq!(combinations[1].tree_prior, TreePrior::BirthDeath);
    assert_eq!(combinations[2].clock, ClockFlavour::Ucln);
    assert_eq!(combinations[4].model.text(), "GTR");
}
