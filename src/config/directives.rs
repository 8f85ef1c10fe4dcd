//! Reader for directive files and alignment lists.
//!
//! A directive file holds one directive per line; lines starting with `#`
//! and blank lines are ignored:
//!
//! ```text
//! # three clocks on two priors
//! -alist alignments.txt
//! -mods HKY+G GTR+IG
//! -clock strict ucln randlocal
//! -tprior yule bd
//! -mcmc 10000000
//! -tsamp 1000
//! -psamp 1000
//! -ssamp 1000
//! -rprior unif 10 20
//! -logphy
//! -fixtree
//! -overwrite
//! ```

use crate::config::{ConfigError, SettingsBuilder, parse_count};
use crate::parser::ByteParser;
use crate::parser::byte_source::TextSource;
use log::debug;
use std::path::{Path, PathBuf};

/// Comment marker of directive and list files.
const COMMENT_MARKER: char = '#';

/// Directives read from a directive file.
#[derive(Debug, Clone)]
pub struct Directives {
    /// Settings accumulated from the directives, on top of the defaults
    pub settings: SettingsBuilder,
    /// Path of the alignment list (`-alist`), if given
    pub alignment_list: Option<PathBuf>,
}

/// Reads a directive file on top of the default settings.
///
/// A relative `-alist` path is resolved against the directory of the
/// directive file.
///
/// # Errors
/// Returns [ConfigError::Unreadable] if the file cannot be read, or the first
/// error raised by a directive.
pub fn read_directive_file<P: AsRef<Path>>(path: P) -> Result<Directives, ConfigError> {
    let path = path.as_ref();
    let parser = ByteParser::for_file(path).map_err(|e| ConfigError::unreadable(path, e))?;

    let mut directives = apply_directive_lines(parser_lines(parser), SettingsBuilder::new())?;
    if let Some(list) = directives.alignment_list.take() {
        directives.alignment_list = Some(resolve_against(path, list));
    }

    Ok(directives)
}

/// Applies the directives in `text` to `settings`.
///
/// # Example
/// ```
/// use beastgen::config::{SettingsBuilder, apply_directives};
///
/// let text = "# demo\n-mods GTR+G\n-clock strict\n-mcmc 5000\n-fixtree\n";
/// let directives = apply_directives(text, SettingsBuilder::new())?;
/// let settings = directives.settings.build()?;
/// assert_eq!(settings.mcmc_length(), 5000);
/// assert!(!settings.manipulates_topology());
/// assert!(directives.alignment_list.is_none());
/// # Ok::<(), beastgen::config::ConfigError>(())
/// ```
pub fn apply_directives(text: &str, settings: SettingsBuilder) -> Result<Directives, ConfigError> {
    apply_directive_lines(parser_lines(ByteParser::for_str(text)), settings)
}

/// Reads the alignment list: one file name per non-blank, non-comment line.
///
/// Relative names are resolved against the directory of the list file.
///
/// # Errors
/// Returns [ConfigError::Unreadable] if the file cannot be read and
/// [ConfigError::EmptyAlignmentList] if it names no files.
pub fn read_alignment_list<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>, ConfigError> {
    let path = path.as_ref();
    let parser = ByteParser::for_file(path).map_err(|e| ConfigError::unreadable(path, e))?;

    let alignments: Vec<PathBuf> = parser_lines(parser)
        .filter_map(|(_, line)| {
            let name = line.trim();
            (!name.is_empty() && !name.starts_with(COMMENT_MARKER))
                .then(|| resolve_against(path, PathBuf::from(name)))
        })
        .collect();

    if alignments.is_empty() {
        return Err(ConfigError::EmptyAlignmentList(path.to_path_buf()));
    }

    Ok(alignments)
}

// ============================================================================
// Helpers (private)
// ============================================================================
/// Iterates the lines of a parser together with their 1-based line numbers.
fn parser_lines(
    mut parser: ByteParser<TextSource>,
) -> impl Iterator<Item = (usize, String)> {
    std::iter::from_fn(move || parser.read_line()).enumerate().map(|(i, line)| (i + 1, line))
}

/// Resolves a relative `target` against the directory holding `anchor`.
fn resolve_against(anchor: &Path, target: PathBuf) -> PathBuf {
    match anchor.parent() {
        Some(dir) if target.is_relative() => dir.join(target),
        _ => target,
    }
}

fn apply_directive_lines(
    lines: impl Iterator<Item = (usize, String)>,
    mut settings: SettingsBuilder,
) -> Result<Directives, ConfigError> {
    let mut alignment_list = None;

    for (line_number, line) in lines {
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };
        if directive.starts_with(COMMENT_MARKER) {
            continue;
        }
        let values: Vec<&str> = tokens.collect();

        let arity = |expected: &'static str| ConfigError::DirectiveArity {
            line: line_number,
            directive: directive.to_string(),
            expected,
        };
        let single = || match values.as_slice() {
            [value] => Ok(*value),
            _ => Err(arity("exactly one value")),
        };
        let some = || {
            if values.is_empty() {
                Err(arity("at least one value"))
            } else {
                Ok(values.iter().copied())
            }
        };
        let none = || {
            if values.is_empty() {
                Ok(())
            } else {
                Err(arity("no values"))
            }
        };

        debug!("Directive line {line_number}: {directive} {values:?}");
        settings = match directive {
            "-alist" => {
                alignment_list = Some(PathBuf::from(single()?));
                settings
            }
            "-mods" => settings.with_sub_models(some()?),
            "-clock" => settings.with_clock_flavours(some()?)?,
            "-tprior" => settings.with_tree_priors(some()?)?,
            "-rprior" => settings.with_root_prior(values.iter())?,
            "-mcmc" => settings.with_mcmc_length(parse_count("mcmc length", single()?)?),
            "-tsamp" => settings.with_tree_sampling(parse_count("tree sampling", single()?)?),
            "-psamp" => {
                settings.with_parameter_sampling(parse_count("parameter sampling", single()?)?)
            }
            "-ssamp" => settings.with_screen_sampling(parse_count("screen sampling", single()?)?),
            "-logphy" => {
                none()?;
                settings.log_phylograms()
            }
            "-fixtree" => {
                none()?;
                settings.fix_topology()
            }
            "-overwrite" => {
                none()?;
                settings.overwrite()
            }
            _ => {
                return Err(ConfigError::UnknownDirective {
                    line: line_number,
                    directive: directive.to_string(),
                });
            }
        };
    }

    Ok(Directives {
        settings,
        alignment_list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines_are_ignored() {
        let text = "\n   \n# -clock nonsense\n\t# indented comment\n-clock strict\n";
        let directives = apply_directives(text, SettingsBuilder::new()).unwrap();
        let settings = directives.settings.build().unwrap();
        assert_eq!(settings.num_clock_flavours(), 1);
    }

    #[test]
    fn test_unknown_directive_reports_line() {
        let err = apply_directives("-mods GTR\n-burnin 10\n", SettingsBuilder::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDirective { line: 2, .. }));
    }

    #[test]
    fn test_directive_arity() {
        let err = apply_directives("-mcmc 10 20\n", SettingsBuilder::new()).unwrap_err();
        assert!(matches!(err, ConfigError::DirectiveArity { line: 1, .. }));

        let err = apply_directives("-logphy yes\n", SettingsBuilder::new()).unwrap_err();
        assert!(matches!(err, ConfigError::DirectiveArity { .. }));

        let err = apply_directives("-clock\n", SettingsBuilder::new()).unwrap_err();
        assert!(matches!(err, ConfigError::DirectiveArity { .. }));
    }

    #[test]
    fn test_malformed_integer_is_fatal() {
        let err = apply_directives("-tsamp often\n", SettingsBuilder::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInteger { .. }));
    }

    #[test]
    fn test_resolve_against() {
        let resolved = resolve_against(Path::new("runs/config.txt"), PathBuf::from("list.txt"));
        assert_eq!(resolved, Path::new("runs").join("list.txt"));

        let absolute = PathBuf::from("/data/list.txt");
        assert_eq!(resolve_against(Path::new("runs/config.txt"), absolute.clone()), absolute);
    }
}
