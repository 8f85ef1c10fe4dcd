//! Nexus keywords and file-naming constants used by the alignment reader.

/// Nexus file header "#NEXUS"
pub(crate) const NEXUS_HEADER: &[u8] = b"#NEXUS";

/// DATA/CHARACTERS block dimensions command "Dimensions"
pub(crate) const DIMENSIONS: &[u8] = b"Dimensions";

/// Number of taxa parameter "ntax"
pub(crate) const NTAX: &[u8] = b"ntax";

/// Number of characters parameter "nchar"
pub(crate) const NCHAR: &[u8] = b"nchar";

/// Format command "Format"
pub(crate) const FORMAT: &[u8] = b"Format";

/// Interleave subcommand of FORMAT "interleave"
pub(crate) const INTERLEAVE: &[u8] = b"interleave";

/// Matrix command "Matrix"
pub(crate) const MATRIX: &[u8] = b"Matrix";

/// Delimiters ending a taxon name in a matrix row
pub(crate) const MATRIX_LABEL_DELIMITERS: &[u8] = b" \t\n\r;[";

/// Delimiter of tokens in simulation file names
pub(crate) const NAME_TOKEN_DELIMITER: char = '_';

/// Position (0-based) of the replicate number in simulation file names
pub(crate) const REPLICATE_TOKEN_INDEX: usize = 11;

/// Number of trailing name tokens replaced to derive the tree file name
pub(crate) const REPLACED_TOKEN_COUNT: usize = 4;

/// Extension of companion tree files
pub(crate) const TREE_FILE_EXTENSION: &str = "phy";
