use beastgen::config::SettingsBuilder;
use beastgen::output::{OutputError, OutputNamer};
use beastgen::{Error, generate_documents, read_alignment};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ALIGNMENT: &str = "b_1_d_0.5_a_0.9_n_4_sim_JC_rep_1.nex";
const COMPANION_TREE: &str = "b_1_d_0.5_a_0.9_n_4_rep_1.phy";

/// Copies the replicate alignment and its companion tree into a fresh directory.
fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let fixtures = Path::new("tests").join("fixtures");
    for name in [ALIGNMENT, COMPANION_TREE] {
        fs::copy(fixtures.join(name), dir.path().join(name)).unwrap();
    }
    let alignment = dir.path().join(ALIGNMENT);
    (dir, alignment)
}

fn xml_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();
    files
}

#[test]
fn test_generate_documents() {
    let (dir, alignment) = workspace();
    let settings = SettingsBuilder::new()
        .with_sub_models(["HKY+G", "GTR"])
        .with_clock_flavours(["strict", "ucln"])
        .unwrap()
        .with_tree_priors(["yule"])
        .unwrap()
        .with_mcmc_length(100_000)
        .build()
        .unwrap();
    let dataset = read_alignment(&alignment).unwrap();
    assert!(dataset.has_starting_tree());

    let namer = OutputNamer::from_settings(&settings);
    let written = generate_documents(&settings, &dataset, &namer, false).unwrap();
    assert_eq!(written.len(), 4);
    assert_eq!(namer.num_claimed(), 4);
    assert_eq!(xml_files(dir.path()).len(), 4);

    let first = dir
        .path()
        .join("b_1_d_0.5_a_0.9_n_4_sim_JC_rep_1_analyze-HKY+G_est-top_yule-prior_strict-clock.xml");
    assert_eq!(written[0], first);

    let text = fs::read_to_string(&first).unwrap();
    assert!(text.contains("<newick id=\"startingTree\" units=\"years\">"));
    assert!(text.contains("chainLength=\"100000\""));
    assert!(text.contains(
        "fileName=\"b_1_d_0.5_a_0.9_n_4_sim_JC_rep_1_analyze-HKY+G_est-top_yule-prior_strict-clock.log\""
    ));
    assert!(text.trim_end().ends_with("</beast>"));
}

#[test]
fn test_existing_files_are_kept_without_overwrite() {
    let (dir, alignment) = workspace();
    let settings = SettingsBuilder::new()
        .with_sub_models(["JC"])
        .build()
        .unwrap();
    let dataset = read_alignment(&alignment).unwrap();

    let written = generate_documents(&settings, &dataset, &OutputNamer::new(false), false).unwrap();
    assert_eq!(written.len(), 1);
    fs::write(&written[0], "keep me").unwrap();

    let result = generate_documents(&settings, &dataset, &OutputNamer::new(false), false);
    match result {
        Err(Error::Output(OutputError::Exists(path))) => assert_eq!(path, written[0]),
        other => panic!("expected an existing-file error, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "keep me");
    assert_eq!(xml_files(dir.path()).len(), 1);
}

#[test]
fn test_overwrite_replaces_files() {
    let (_dir, alignment) = workspace();
    let settings = SettingsBuilder::new()
        .with_sub_models(["JC"])
        .overwrite()
        .build()
        .unwrap();
    let dataset = read_alignment(&alignment).unwrap();

    let written = generate_documents(&settings, &dataset, &OutputNamer::from_settings(&settings), false)
        .unwrap();
    fs::write(&written[0], "stale").unwrap();

    let again = generate_documents(&settings, &dataset, &OutputNamer::from_settings(&settings), false)
        .unwrap();
    assert_eq!(again, written);
    assert!(fs::read_to_string(&written[0]).unwrap().contains("<beast>"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let (dir, alignment) = workspace();
    let settings = SettingsBuilder::new()
        .with_tree_priors(["yule", "concoal", "expcoal"])
        .unwrap()
        .build()
        .unwrap();
    let dataset = read_alignment(&alignment).unwrap();

    let checked = generate_documents(&settings, &dataset, &OutputNamer::new(false), true).unwrap();
    assert_eq!(checked.len(), settings.combinations().len());
    assert!(xml_files(dir.path()).is_empty());
}

#[test]
fn test_same_namer_rejects_repeated_dataset() {
    let (_dir, alignment) = workspace();
    let settings = SettingsBuilder::new()
        .with_sub_models(["K80"])
        .build()
        .unwrap();
    let dataset = read_alignment(&alignment).unwrap();
    let namer = OutputNamer::new(true);

    generate_documents(&settings, &dataset, &namer, true).unwrap();
    let result = generate_documents(&settings, &dataset, &namer, true);
    assert!(matches!(
        result,
        Err(Error::Output(OutputError::DuplicateInRun(_)))
    ));
}
