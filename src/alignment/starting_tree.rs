//! Starting trees: where to look for them and how to read them.

use crate::alignment::defs::{
    NAME_TOKEN_DELIMITER, REPLACED_TOKEN_COUNT, REPLICATE_TOKEN_INDEX, TREE_FILE_EXTENSION,
};
use crate::parser::ByteParser;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};
use std::path::{Path, PathBuf};

/// Where the starting tree of an alignment comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartingTreeSource {
    /// The companion file derived from the alignment name
    /// (see [companion_tree_path]), which must exist; a file without tree
    /// means no starting tree.
    #[default]
    Companion,
    /// An explicit tree file, which must exist and hold a tree.
    File(PathBuf),
    /// No starting tree; documents seed a random coalescent tree.
    None,
}

/// Derives the companion tree file of a simulated alignment.
///
/// Simulation outputs are named `b_<>_d_<>_a_<>_n_<>_sim_<>_rep_<r>`: the
/// replicate number `r` is the 12th `_`-token of the file stem (or the last
/// token of shorter stems), the last four tokens are dropped and
/// `_rep_<r>.phy` is attached.
///
/// # Example
/// ```
/// use beastgen::alignment::companion_tree_path;
/// use std::path::Path;
///
/// let path = companion_tree_path(Path::new("sims/b_1_d_0.5_a_0.9_n_100_sim_JC_rep_4.nex"));
/// assert_eq!(path, Path::new("sims/b_1_d_0.5_a_0.9_n_100_rep_4.phy"));
/// ```
pub fn companion_tree_path(alignment: &Path) -> PathBuf {
    let stem = alignment
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tokens: Vec<&str> = stem.split(NAME_TOKEN_DELIMITER).collect();

    let replicate = tokens
        .get(REPLICATE_TOKEN_INDEX)
        .or(tokens.last())
        .copied()
        .unwrap_or_default();
    let kept = tokens.len().saturating_sub(REPLACED_TOKEN_COUNT).max(1);
    let prefix = tokens[..kept].join("_");

    alignment.with_file_name(format!("{prefix}_rep_{replicate}.{TREE_FILE_EXTENSION}"))
}

/// Reads a starting tree: the last line that is neither blank nor a
/// `[`-comment, taken verbatim (trimmed).
///
/// # Errors
/// Returns an IO error if the file cannot be read.
///
/// # Returns
/// `None` if the file holds no such line
pub fn read_starting_tree<P: AsRef<Path>>(path: P) -> Result<Option<String>, ParsingError> {
    let mut parser = ByteParser::for_file(path)?;

    let mut tree = None;
    while let Some(line) = parser.read_line() {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('[') {
            tree = Some(line.to_string());
        }
    }

    Ok(tree)
}

/// Resolves the starting tree of `alignment` according to `source`.
///
/// # Errors
/// An unreadable tree file is an error for both file sources. A file without
/// tree is an error only for [StartingTreeSource::File].
pub(crate) fn resolve_starting_tree(
    alignment: &Path,
    source: &StartingTreeSource,
) -> Result<Option<String>, ParsingError> {
    match source {
        StartingTreeSource::None => Ok(None),
        StartingTreeSource::File(path) => match open_tree_file(path)? {
            Some(tree) => Ok(Some(tree)),
            None => Err(ParsingError::without_context(ParsingErrorType::MissingTree)),
        },
        StartingTreeSource::Companion => {
            let path = companion_tree_path(alignment);
            let tree = open_tree_file(&path)?;
            if tree.is_none() {
                log::info!(
                    "Starting tree file '{}' holds no tree; a random starting tree will be generated",
                    path.display()
                );
            }
            Ok(tree)
        }
    }
}

/// [read_starting_tree] with the tree file named in IO errors.
fn open_tree_file(path: &Path) -> Result<Option<String>, ParsingError> {
    read_starting_tree(path).map_err(|err| match err.kind() {
        ParsingErrorType::IoError(msg) => ParsingError::without_context(
            ParsingErrorType::IoError(format!("starting tree file '{}': {msg}", path.display())),
        ),
        _ => err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companion_of_short_names() {
        assert_eq!(
            companion_tree_path(Path::new("data.nex")),
            Path::new("data_rep_data.phy")
        );
        assert_eq!(
            companion_tree_path(Path::new("a_b_c_d_e_f.nex")),
            Path::new("a_b_rep_f.phy")
        );
    }

    #[test]
    fn test_companion_keeps_only_last_extension() {
        assert_eq!(
            companion_tree_path(Path::new("b_1_d_0.5_a_0.9_n_100_sim_HKY_rep_12.nexus")),
            Path::new("b_1_d_0.5_a_0.9_n_100_rep_12.phy")
        );
    }
}
