//! Sequence alignments and their starting trees.
//!
//! An [AlignmentDataset] holds the taxa and sequences read from the matrix of
//! a Nexus file, the root name the output files derive from, and an optional
//! starting tree. It is read with the [AlignmentReaderBuilder]:
//!
//! ```no_run
//! use beastgen::alignment::AlignmentReaderBuilder;
//!
//! let dataset = AlignmentReaderBuilder::for_file("primates.nex").read()?;
//! for taxon in dataset.taxa() {
//!     println!("{}: {}", taxon.name, taxon.sequence);
//! }
//! # Ok::<(), beastgen::parser::ParsingError>(())
//! ```

pub(crate) mod defs;
pub mod reader;
pub mod starting_tree;

pub use reader::AlignmentReaderBuilder;
pub use starting_tree::{StartingTreeSource, companion_tree_path, read_starting_tree};

use std::path::{Path, PathBuf};

/// A named sequence of an alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub name: String,
    pub sequence: String,
}

impl Taxon {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }
}

// =#========================================================================#=
// ALIGNMENT DATASET
// =#========================================================================#=
/// Taxa and sequences of one alignment, with an optional starting tree.
///
/// Taxa keep the order of the matrix; duplicate names are kept as they are.
/// The dataset is read-only once constructed and shared by all documents
/// generated from it.
#[derive(Debug, Clone)]
pub struct AlignmentDataset {
    root: PathBuf,
    num_char: usize,
    taxa: Vec<Taxon>,
    starting_tree: Option<String>,
}

impl AlignmentDataset {
    /// Creates a dataset from taxa already in memory.
    ///
    /// The declared number of characters is taken from the first sequence.
    ///
    /// # Arguments
    /// * `root` - Root name of output files (the alignment path without extension)
    /// * `taxa` - Taxa in alignment order
    ///
    /// # Example
    /// ```
    /// use beastgen::alignment::{AlignmentDataset, Taxon};
    ///
    /// let dataset = AlignmentDataset::new(
    ///     "runs/toy",
    ///     vec![Taxon::new("A", "ACGT"), Taxon::new("B", "ACGA")],
    /// )
    /// .with_starting_tree("(A:1.0,B:1.0);");
    /// assert_eq!(dataset.num_taxa(), 2);
    /// assert_eq!(dataset.num_char(), 4);
    /// assert!(dataset.has_starting_tree());
    /// ```
    pub fn new(root: impl Into<PathBuf>, taxa: Vec<Taxon>) -> Self {
        let num_char = taxa.first().map_or(0, |taxon| taxon.sequence.len());
        Self::from_parts(root.into(), num_char, taxa, None)
    }

    pub(crate) fn from_parts(
        root: PathBuf,
        num_char: usize,
        taxa: Vec<Taxon>,
        starting_tree: Option<String>,
    ) -> Self {
        Self {
            root,
            num_char,
            taxa,
            starting_tree,
        }
    }

    /// Replaces the starting tree.
    pub fn with_starting_tree(mut self, tree: impl Into<String>) -> Self {
        self.starting_tree = Some(tree.into());
        self
    }

    pub fn num_taxa(&self) -> usize {
        self.taxa.len()
    }

    /// Number of characters declared by the alignment.
    pub fn num_char(&self) -> usize {
        self.num_char
    }

    /// Number of characters actually read for the first taxon.
    ///
    /// Differs from [num_char()](Self::num_char) only if the alignment was
    /// read without strict character counting.
    pub fn chars_read(&self) -> usize {
        self.taxa.first().map_or(0, |taxon| taxon.sequence.len())
    }

    pub fn taxa(&self) -> &[Taxon] {
        &self.taxa
    }

    /// Path of the alignment without its final extension.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name part of [root()](Self::root).
    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn has_starting_tree(&self) -> bool {
        self.starting_tree.is_some()
    }

    pub fn starting_tree(&self) -> Option<&str> {
        self.starting_tree.as_deref()
    }
}

/// Reads the alignment at `path` with default settings (companion starting
/// tree, lenient character count).
///
/// # Errors
/// See [AlignmentReaderBuilder::read].
pub fn read_alignment<P: AsRef<Path>>(
    path: P,
) -> Result<AlignmentDataset, crate::parser::ParsingError> {
    AlignmentReaderBuilder::for_file(path).read()
}
