use anyhow::{Context, Result};
use beastgen::alignment::{AlignmentReaderBuilder, StartingTreeSource};
use beastgen::config::{ConfigError, read_alignment_list, read_directive_file};
use beastgen::error::{ERROR_REPORT_FILE, fatal_report};
use beastgen::generate_documents;
use beastgen::output::OutputNamer;
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "beastgen")]
#[command(about = "Batch generator of BEAST XML analysis files", long_about = None)]
#[command(version)]
struct Cli {
    /// Directive file (alignment list, models, clocks, tree priors, chain settings)
    #[arg(short, long)]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of worker threads (default: one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Fail if an alignment has more taxa, or fewer or more characters, than declared
    #[arg(long)]
    strict_nchar: bool,

    /// Ignore companion tree files and always seed a random starting tree
    #[arg(long)]
    no_starting_tree: bool,

    /// Accept substitution models beastgen does not know (documents lack the model)
    #[arg(long)]
    allow_unknown_models: bool,

    /// Assemble and check documents without writing them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(count) => {
            let verb = if cli.dry_run { "Checked" } else { "Wrote" };
            info!("{verb} {count} document(s)");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Runs the whole batch and returns the number of documents produced.
fn run(cli: &Cli) -> Result<usize> {
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure the worker pool")?;
    }

    let directives = read_directive_file(&cli.config)?;
    let mut builder = directives.settings;
    if cli.allow_unknown_models {
        builder = builder.allow_unrecognized_models();
    }
    let settings = builder.build()?;
    let list = directives
        .alignment_list
        .ok_or(ConfigError::MissingAlignmentList)?;
    let alignments = read_alignment_list(&list)?;
    info!(
        "{} alignment(s) x {} combination(s)",
        alignments.len(),
        settings.combinations().len()
    );

    let namer = OutputNamer::from_settings(&settings);
    let mut count = 0;
    for path in &alignments {
        let mut reader = AlignmentReaderBuilder::for_file(path);
        if cli.no_starting_tree {
            reader = reader.with_starting_tree(StartingTreeSource::None);
        }
        if cli.strict_nchar {
            reader = reader.with_strict_char_count();
        }
        let dataset = reader
            .read()
            .map_err(|source| beastgen::Error::Parsing {
                path: path.clone(),
                source,
            })?;
        info!(
            "Read '{}': {} taxa, {} characters, {} starting tree",
            path.display(),
            dataset.num_taxa(),
            dataset.num_char(),
            if dataset.has_starting_tree() { "with" } else { "no" }
        );

        count += generate_documents(&settings, &dataset, &namer, cli.dry_run)?.len();
    }

    Ok(count)
}

/// Reports a fatal error to stderr and to the error report file.
fn report_failure(err: &anyhow::Error) {
    let root_prior_arity = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ConfigError>(),
            Some(ConfigError::RootPriorArity(_))
        ) || cause
            .downcast_ref::<beastgen::Error>()
            .is_some_and(beastgen::Error::is_root_prior_arity)
    });

    let report = fatal_report(&format!("{err:#}"), root_prior_arity);
    eprint!("{report}");
    if let Err(io_err) = fs::write(ERROR_REPORT_FILE, &report) {
        warn!("Unable to write '{ERROR_REPORT_FILE}': {io_err}");
    }
}
