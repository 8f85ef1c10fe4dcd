//! Reading the DATA matrix of Nexus alignment files.
//!
//! This module provides the [AlignmentReaderBuilder], which reads the
//! dimensions, the interleave flag and the matrix of a Nexus file and
//! resolves its starting tree.

use crate::alignment::defs::*;
use crate::alignment::starting_tree::{StartingTreeSource, resolve_starting_tree};
use crate::alignment::{AlignmentDataset, Taxon};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};
use log::{debug, warn};
use std::path::{Path, PathBuf};

// =#========================================================================#=
// ALIGNMENT READER BUILDER
// =#========================================================================#=
/// Builder for configuring how a Nexus alignment is read.
///
/// # Configuration Options
/// * **Starting tree**: [`with_starting_tree()`](Self::with_starting_tree)
///   selects where the starting tree comes from; the default is the
///   companion `.phy` file next to the alignment.
/// * **Character count**: [`with_strict_char_count()`](Self::with_strict_char_count)
///   turns a mismatch between declared and read `nchar`, or more matrix rows
///   than the declared `ntax`, into an error (otherwise it is logged as warning).
///
/// # Example
/// ```no_run
/// use beastgen::alignment::{AlignmentReaderBuilder, StartingTreeSource};
///
/// let dataset = AlignmentReaderBuilder::for_file("sims/b_1_d_0.5_a_0.9_n_100_sim_JC_rep_1.nex")
///     .with_starting_tree(StartingTreeSource::None)
///     .with_strict_char_count()
///     .read()?;
/// println!("{} taxa, {} sites", dataset.num_taxa(), dataset.num_char());
/// # Ok::<(), beastgen::parser::ParsingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AlignmentReaderBuilder {
    path: PathBuf,
    starting_tree: StartingTreeSource,
    strict_char_count: bool,
}

// ============================================================================
// Building (pub)
// ============================================================================
impl AlignmentReaderBuilder {
    /// Creates a new builder for the alignment at `path`.
    ///
    /// The file is read on [read()](Self::read).
    pub fn for_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            starting_tree: StartingTreeSource::default(),
            strict_char_count: false,
        }
    }

    /// Configure where the starting tree comes from.
    pub fn with_starting_tree(mut self, source: StartingTreeSource) -> Self {
        self.starting_tree = source;
        self
    }

    /// Configure the reader to reject sequences whose length differs from
    /// the declared `nchar` and matrices with rows beyond the declared `ntax`.
    pub fn with_strict_char_count(mut self) -> Self {
        self.strict_char_count = true;
        self
    }

    /// Reads the alignment and its starting tree.
    ///
    /// # Errors
    /// Returns a [ParsingError] if the file cannot be read, has no matrix,
    /// declares invalid dimensions, holds fewer rows than declared, or (in
    /// strict mode) more rows than declared or a sequence of unexpected
    /// length; also if the starting tree file cannot be read.
    pub fn read(self) -> Result<AlignmentDataset, ParsingError> {
        let parser = ByteParser::for_file(&self.path)?;
        let matrix = AlignmentReader::new(parser).read_matrix()?;
        check_taxon_count(&matrix, self.strict_char_count)?;
        check_char_count(&matrix, self.strict_char_count)?;

        let starting_tree = resolve_starting_tree(&self.path, &self.starting_tree)?;
        debug!(
            "Read {} taxa x {} characters from '{}' (starting tree: {})",
            matrix.taxa.len(),
            matrix.num_char,
            self.path.display(),
            starting_tree.is_some()
        );

        Ok(AlignmentDataset::from_parts(
            self.path.with_extension(""),
            matrix.num_char,
            matrix.taxa,
            starting_tree,
        ))
    }
}

// =#========================================================================#=
// ALIGNMENT READER
// =#========================================================================#=
/// Declared dimensions and the taxa read from a matrix.
#[derive(Debug)]
pub(crate) struct Matrix {
    pub(crate) num_char: usize,
    pub(crate) taxa: Vec<Taxon>,
    /// Rows found before the closing `;` beyond the declared `ntax`; not kept.
    pub(crate) surplus_rows: usize,
}

/// Reads the matrix from a Nexus byte stream.
pub(crate) struct AlignmentReader<S: ByteSource> {
    parser: ByteParser<S>,
    num_taxa: Option<usize>,
    num_char: Option<usize>,
    interleaved: bool,
}

impl<S: ByteSource> AlignmentReader<S> {
    pub(crate) fn new(parser: ByteParser<S>) -> Self {
        Self {
            parser,
            num_taxa: None,
            num_char: None,
            interleaved: false,
        }
    }

    /// Scans commands up to MATRIX, then reads the rows.
    pub(crate) fn read_matrix(mut self) -> Result<Matrix, ParsingError> {
        self.scan_to_matrix()?;

        let (Some(num_taxa), Some(num_char)) = (self.num_taxa, self.num_char) else {
            return Err(ParsingError::invalid_dimensions(
                &self.parser,
                "ntax and nchar must be declared before the matrix".to_string(),
            ));
        };

        let taxa = if self.interleaved {
            self.read_interleaved_rows(num_taxa, num_char)?
        } else {
            self.read_sequential_rows(num_taxa)?
        };

        let mut surplus_rows = 0;
        while self.read_row()?.is_some() {
            surplus_rows += 1;
        }

        Ok(Matrix {
            num_char,
            taxa,
            surplus_rows,
        })
    }

    // ============================================================================
    // Commands (private)
    // ============================================================================
    fn scan_to_matrix(&mut self) -> Result<(), ParsingError> {
        loop {
            self.parser.skip_comment_and_whitespace()?;
            if self.parser.is_eof() {
                return Err(ParsingError::missing_matrix(&self.parser));
            }

            let word = self.parser.parse_word(b";=")?;
            let keyword = word.as_bytes();
            if keyword.is_empty() {
                // stray ';' or '='
                self.parser.next_byte();
            } else if keyword.eq_ignore_ascii_case(NEXUS_HEADER) {
                continue;
            } else if keyword.eq_ignore_ascii_case(DIMENSIONS) {
                self.parse_dimensions()?;
            } else if keyword.eq_ignore_ascii_case(FORMAT) {
                self.parse_format()?;
            } else if keyword.eq_ignore_ascii_case(MATRIX) {
                return Ok(());
            } else {
                self.parser.skip_command()?;
            }
        }
    }

    /// Parses `key=value` pairs of DIMENSIONS in any order until `;`.
    fn parse_dimensions(&mut self) -> Result<(), ParsingError> {
        while let Some((key, value)) = self.next_subcommand()? {
            let Some(value) = value else { continue };
            let key = key.as_bytes();
            if key.eq_ignore_ascii_case(NTAX) {
                self.num_taxa = Some(self.parse_dimension("ntax", &value)?);
            } else if key.eq_ignore_ascii_case(NCHAR) {
                self.num_char = Some(self.parse_dimension("nchar", &value)?);
            }
        }
        Ok(())
    }

    /// Parses FORMAT until `;`, only regarding its interleave flag.
    fn parse_format(&mut self) -> Result<(), ParsingError> {
        while let Some((key, value)) = self.next_subcommand()? {
            if !key.as_bytes().eq_ignore_ascii_case(INTERLEAVE) {
                continue;
            }
            self.interleaved = match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
                None | Some("yes") => true,
                Some("no") => false,
                Some(other) => {
                    return Err(ParsingError::invalid_format(
                        &self.parser,
                        format!("interleave={other} is neither yes nor no"),
                    ));
                }
            };
        }
        Ok(())
    }

    /// Reads the next `key[=value]` of a command.
    ///
    /// # Returns
    /// `None` once the terminating `;` has been consumed
    fn next_subcommand(&mut self) -> Result<Option<(String, Option<String>)>, ParsingError> {
        let key = self.parser.parse_word(b";=")?;
        if key.is_empty() {
            return match self.parser.next_byte() {
                Some(b';') => Ok(None),
                Some(_) => Ok(Some((key, None))),
                None => Err(ParsingError::unexpected_eof(&self.parser)),
            };
        }

        self.parser.skip_comment_and_whitespace()?;
        if !self.parser.consume_if(b'=') {
            return Ok(Some((key, None)));
        }

        self.parser.skip_comment_and_whitespace()?;
        let value = if self.parser.consume_if(b'"') {
            let quoted = self.parser.parse_unquoted_label(b"\"")?;
            if !self.parser.consume_if(b'"') {
                return Err(ParsingError::unexpected_eof(&self.parser));
            }
            quoted
        } else {
            self.parser.parse_word(b";")?
        };
        Ok(Some((key, Some(value))))
    }

    fn parse_dimension(&self, name: &str, value: &str) -> Result<usize, ParsingError> {
        match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ParsingError::invalid_dimensions(
                &self.parser,
                format!("{name}={value} is not a positive integer"),
            )),
        }
    }

    // ============================================================================
    // Matrix rows (private)
    // ============================================================================
    fn read_sequential_rows(&mut self, num_taxa: usize) -> Result<Vec<Taxon>, ParsingError> {
        let mut taxa = Vec::with_capacity(num_taxa);
        for _ in 0..num_taxa {
            let (name, sequence) = self.read_row()?.ok_or_else(|| {
                ParsingError::invalid_matrix(
                    &self.parser,
                    format!("expected {num_taxa} taxa but found {}", taxa.len()),
                )
            })?;
            taxa.push(Taxon::new(name, sequence));
        }
        Ok(taxa)
    }

    /// Reads blocks of `num_taxa` rows, appending fragments by row index,
    /// until the first taxon holds `num_char` characters or the matrix ends.
    fn read_interleaved_rows(
        &mut self,
        num_taxa: usize,
        num_char: usize,
    ) -> Result<Vec<Taxon>, ParsingError> {
        let mut taxa: Vec<Taxon> = Vec::with_capacity(num_taxa);

        'blocks: loop {
            for index in 0..num_taxa {
                let Some((name, fragment)) = self.read_row()? else {
                    if index == 0 && !taxa.is_empty() {
                        break 'blocks;
                    }
                    return Err(ParsingError::invalid_matrix(
                        &self.parser,
                        format!("interleaved block ends after {index} of {num_taxa} rows"),
                    ));
                };

                match taxa.get_mut(index) {
                    Some(taxon) => {
                        if taxon.name != name {
                            warn!(
                                "Interleaved row {} is labelled '{name}' but continues '{}'",
                                index + 1,
                                taxon.name
                            );
                        }
                        taxon.sequence.push_str(&fragment);
                    }
                    None => taxa.push(Taxon::new(name, fragment)),
                }
            }

            if taxa[0].sequence.len() >= num_char {
                break;
            }
        }

        Ok(taxa)
    }

    /// Reads one `name sequence` row.
    ///
    /// # Returns
    /// `None` if the matrix ends (`;` or EOF) before a row starts
    fn read_row(&mut self) -> Result<Option<(String, String)>, ParsingError> {
        self.parser.skip_comment_and_whitespace()?;
        if self.parser.is_eof() || self.parser.peek() == Some(b';') {
            return Ok(None);
        }

        let name = self.parser.parse_label(MATRIX_LABEL_DELIMITERS)?;
        let sequence = self.parser.parse_word(b";")?;
        if sequence.is_empty() {
            return Err(ParsingError::invalid_matrix(
                &self.parser,
                format!("taxon '{name}' has no sequence"),
            ));
        }

        Ok(Some((name, sequence)))
    }
}

/// Checks that the matrix holds no rows beyond the declared `ntax`.
fn check_taxon_count(matrix: &Matrix, strict: bool) -> Result<(), ParsingError> {
    if matrix.surplus_rows == 0 {
        return Ok(());
    }

    let declared = matrix.taxa.len();
    let read = declared + matrix.surplus_rows;
    if strict {
        return Err(ParsingError::without_context(
            ParsingErrorType::TaxonCountMismatch { declared, read },
        ));
    }
    warn!("Declared ntax={declared} but the matrix holds {read} rows; extra rows are ignored");
    Ok(())
}

/// Compares every sequence length with the declared `nchar`.
fn check_char_count(matrix: &Matrix, strict: bool) -> Result<(), ParsingError> {
    let Some(taxon) = matrix
        .taxa
        .iter()
        .find(|taxon| taxon.sequence.len() != matrix.num_char)
    else {
        return Ok(());
    };

    let read = taxon.sequence.len();
    if strict {
        return Err(ParsingError::without_context(
            ParsingErrorType::CharCountMismatch {
                declared: matrix.num_char,
                read,
            },
        ));
    }
    warn!(
        "Declared nchar={} but taxon '{}' has {read} characters",
        matrix.num_char, taxon.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Matrix, ParsingError> {
        AlignmentReader::new(ByteParser::for_str(text)).read_matrix()
    }

    #[test]
    fn test_sequential_matrix() {
        let matrix = read(
            "#NEXUS\nBEGIN DATA;\n\tDIMENSIONS NTAX=2 NCHAR=4;\n\tFORMAT DATATYPE=DNA MISSING=? GAP=-;\n\
             MATRIX\n\tA ACGT\n\t'B c' AC-T\n;\nEND;\n",
        )
        .unwrap();
        assert_eq!(matrix.num_char, 4);
        assert_eq!(matrix.taxa.len(), 2);
        assert_eq!(matrix.taxa[1].name, "B c");
        assert_eq!(matrix.taxa[1].sequence, "AC-T");
    }

    #[test]
    fn test_dimensions_in_any_order() {
        let matrix = read("begin data; dimensions nchar=2 [x] ntax=1; matrix t1 AC;").unwrap();
        assert_eq!(matrix.num_char, 2);
        assert_eq!(matrix.taxa[0].name, "t1");
    }

    #[test]
    fn test_interleaved_matrix() {
        let matrix = read(
            "#NEXUS\nbegin data;\ndimensions ntax=2 nchar=6;\nformat datatype=dna interleave=yes;\n\
             matrix\nA ACG\nB TTT\n\nA TAC\nB GGG\n;\nend;",
        )
        .unwrap();
        assert_eq!(matrix.taxa[0].sequence, "ACGTAC");
        assert_eq!(matrix.taxa[1].sequence, "TTTGGG");
    }

    #[test]
    fn test_bare_interleave_and_quoted_symbols() {
        let matrix = read(
            "begin data; dimensions ntax=1 nchar=2; format symbols=\"A C G T\" interleave; \
             matrix x A\nx C\n;",
        )
        .unwrap();
        assert_eq!(matrix.taxa[0].sequence, "AC");
    }

    #[test]
    fn test_missing_matrix() {
        let err = read("#NEXUS begin data; dimensions ntax=1 nchar=2; end;").unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::MissingMatrix);
    }

    #[test]
    fn test_missing_dimensions() {
        let err = read("begin data; matrix a AC;").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidDimensions(_)));
    }

    #[test]
    fn test_zero_taxa_rejected() {
        let err = read("dimensions ntax=0 nchar=2; matrix ;").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidDimensions(_)));
    }

    #[test]
    fn test_truncated_matrix() {
        let err = read("dimensions ntax=3 nchar=2; matrix a AC b GT;").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidMatrix(_)));
    }

    #[test]
    fn test_surplus_rows_are_counted() {
        let matrix = read("dimensions ntax=2 nchar=4; matrix A ACGT B ACGA C TTTT;").unwrap();
        assert_eq!(matrix.taxa.len(), 2);
        assert_eq!(matrix.taxa[1].name, "B");
        assert_eq!(matrix.surplus_rows, 1);

        assert!(check_taxon_count(&matrix, false).is_ok());
        let err = check_taxon_count(&matrix, true).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParsingErrorType::TaxonCountMismatch {
                declared: 2,
                read: 3
            }
        );
    }

    #[test]
    fn test_exact_rows_have_no_surplus() {
        let matrix = read("dimensions ntax=2 nchar=4; matrix A ACGT [done] B ACGA\n;\nend;").unwrap();
        assert_eq!(matrix.surplus_rows, 0);
        assert!(check_taxon_count(&matrix, true).is_ok());
    }

    #[test]
    fn test_char_count_check() {
        let matrix = read("dimensions ntax=2 nchar=3; matrix a ACG b AC;").unwrap();
        assert!(check_char_count(&matrix, false).is_ok());
        let err = check_char_count(&matrix, true).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParsingErrorType::CharCountMismatch {
                declared: 3,
                read: 2
            }
        );
    }
}
