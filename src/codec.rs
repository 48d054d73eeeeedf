//! Line-oriented digraph codecs.
//!
//! Two formats are supported, one digraph per line, lines numbered from 1:
//!
//! - bit-triangle (`.txt`): the upper triangle of a tournament's adjacency
//!   matrix over `{0,1}`, row-major over pairs `(u, v)` with `u < v`. A `1`
//!   means `u -> v`, a `0` means `v -> u`. Vertices are labelled `1..=n`.
//! - digraph6 (`.d6`): `&`, one order byte (`63 + n`, `n <= 62`), then the
//!   `n * n` adjacency matrix packed six bits per byte, big-endian, each
//!   byte offset by 63. Vertices are labelled `0..n`.

use crate::utils::{num_combinations, triangular_order};
use crate::Digraph;
use nom::{
    character::complete::{char, one_of, satisfy},
    combinator::{all_consuming, map},
    multi::many1,
    IResult,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest order expressible with the single-byte digraph6 order field.
pub const DIGRAPH6_MAX_ORDER: usize = 62;

const DIGRAPH6_OFFSET: u8 = 63;
const DIGRAPH6_MAX_BYTE: u8 = 125;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid number of chars: {found} does not encode a digraph in this format")]
    Length { found: usize },
    #[error("invalid content: found illegal char {found:?}")]
    Content { found: char },
    #[error("line {line} is empty, possibly out of bounds")]
    LineRange { line: usize },
    #[error("line starts with {found:?}, expected '&'")]
    Format { found: char },
    #[error("decoded digraph {name} is not a tournament")]
    Consistency { name: String },
    #[error("file {} has an unknown extension, expected .txt or .d6", path.display())]
    FileType { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// The two supported line formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    BitTriangle,
    Digraph6,
}

impl Format {
    /// Picks the format from a corpus file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => Ok(Format::BitTriangle),
            Some("d6") => Ok(Format::Digraph6),
            _ => Err(CodecError::FileType {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn parse_line(self, line: &str, name: impl Into<String>) -> Result<Digraph> {
        match self {
            Format::BitTriangle => parse_bit_triangle(line, name),
            Format::Digraph6 => parse_digraph6(line, name),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "bit-triangle" | "triangle" => Ok(Format::BitTriangle),
            "d6" | "digraph6" => Ok(Format::Digraph6),
            _ => Err(format!(
                "Invalid format: {}. Use 'bit-triangle' or 'digraph6'",
                s
            )),
        }
    }
}

/// First character of the unparsed remainder, for error reporting.
fn offending_char(rest: &str) -> CodecError {
    match rest.chars().next() {
        Some(found) => CodecError::Content { found },
        None => CodecError::Length { found: 0 },
    }
}

/// Parse a run of arc bits, failing at the first character outside {0,1}
fn arc_bits(input: &str) -> IResult<&str, Vec<bool>> {
    all_consuming(many1(map(one_of("01"), |c| c == '1')))(input)
}

/// Parse a single printable digraph6 byte into its 6-bit value
fn d6_value(input: &str) -> IResult<&str, u8> {
    map(
        satisfy(|c| (DIGRAPH6_OFFSET as char..=DIGRAPH6_MAX_BYTE as char).contains(&c)),
        |c| c as u8 - DIGRAPH6_OFFSET,
    )(input)
}

/// Parse the payload after the '&' delimiter: order byte then matrix bytes
fn d6_values(input: &str) -> IResult<&str, Vec<u8>> {
    all_consuming(many1(d6_value))(input)
}

fn map_nom_error(err: nom::Err<nom::error::Error<&str>>) -> CodecError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => offending_char(e.input),
        nom::Err::Incomplete(_) => CodecError::Length { found: 0 },
    }
}

/// Decode one bit-triangle line into a tournament on vertices `1..=n`.
pub fn parse_bit_triangle(line: &str, name: impl Into<String>) -> Result<Digraph> {
    let name = name.into();
    let line = line.trim();

    let (_, bits) = arc_bits(line).map_err(map_nom_error)?;
    let n = triangular_order(bits.len()).ok_or(CodecError::Length { found: bits.len() })?;

    let mut arcs = Vec::with_capacity(bits.len());
    let mut bit = bits.iter();
    for u in 1..n {
        for v in (u + 1)..=n {
            match bit.next() {
                Some(true) => arcs.push((u, v)),
                Some(false) => arcs.push((v, u)),
                None => return Err(CodecError::Length { found: bits.len() }),
            }
        }
    }

    let tournament = Digraph::from_labels(name, 1..=n, arcs);
    if !tournament.is_tournament() {
        return Err(CodecError::Consistency {
            name: tournament.name().to_string(),
        });
    }
    log::debug!(
        "decoded bit-triangle {}: order {}, size {}",
        tournament.name(),
        tournament.order(),
        tournament.size()
    );
    Ok(tournament)
}

/// Decode one digraph6 line into a digraph on vertices `0..n`.
pub fn parse_digraph6(line: &str, name: impl Into<String>) -> Result<Digraph> {
    let line = line.trim();

    let (payload, _) = char::<&str, nom::error::Error<&str>>('&')(line).map_err(|_| {
        match line.chars().next() {
            Some(found) => CodecError::Format { found },
            None => CodecError::LineRange { line: 0 },
        }
    })?;
    if payload.is_empty() {
        return Err(CodecError::Length { found: 0 });
    }

    let (_, values) = d6_values(payload).map_err(map_nom_error)?;
    let n = values[0] as usize;
    let matrix = &values[1..];

    let needed = n * n;
    if matrix.len() * 6 < needed {
        return Err(CodecError::Length {
            found: matrix.len(),
        });
    }

    let bits = matrix
        .iter()
        .flat_map(|&value| (0..6).rev().map(move |shift| (value >> shift) & 1 == 1));

    let arcs: Vec<(usize, usize)> = bits
        .take(needed)
        .enumerate()
        .filter(|&(_, set)| set)
        .map(|(position, _)| (position / n, position % n))
        .collect();

    let digraph = Digraph::from_labels(name, 0..n, arcs);
    log::debug!(
        "decoded digraph6 {}: order {}, size {}",
        digraph.name(),
        digraph.order(),
        digraph.size()
    );
    Ok(digraph)
}

/// Select a 1-indexed, non-empty line of `source`.
pub fn select_line(source: &str, line_index: usize) -> Result<&str> {
    line_index
        .checked_sub(1)
        .and_then(|i| source.lines().nth(i))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or(CodecError::LineRange { line: line_index })
}

/// Decode line `line_index` of a bit-triangle corpus text.
pub fn decode_bit_triangle(source: &str, line_index: usize, name: impl Into<String>) -> Result<Digraph> {
    parse_bit_triangle(select_line(source, line_index)?, name)
}

/// Decode line `line_index` of a digraph6 corpus text.
pub fn decode_digraph6(source: &str, line_index: usize, name: impl Into<String>) -> Result<Digraph> {
    parse_digraph6(select_line(source, line_index)?, name)
}

/// Encode a tournament as a bit-triangle line, using vertex index order.
pub fn encode_bit_triangle(tournament: &Digraph) -> Result<String> {
    if !tournament.is_tournament() {
        return Err(CodecError::Consistency {
            name: tournament.name().to_string(),
        });
    }
    let n = tournament.order();
    let mut line = String::with_capacity(num_combinations(n, 2));
    for u in 0..n {
        for v in (u + 1)..n {
            line.push(if tournament.has_arc(u, v) { '1' } else { '0' });
        }
    }
    Ok(line)
}

/// Encode a digraph of order at most 62 as a digraph6 line.
pub fn encode_digraph6(digraph: &Digraph) -> Result<String> {
    let n = digraph.order();
    if n > DIGRAPH6_MAX_ORDER {
        return Err(CodecError::Length { found: n });
    }

    let mut bits = vec![false; n * n];
    for (u, v) in digraph.arcs() {
        bits[n * u + v] = true;
    }

    let mut line = String::with_capacity(2 + bits.len().div_ceil(6));
    line.push('&');
    line.push((DIGRAPH6_OFFSET + n as u8) as char);
    for group in bits.chunks(6) {
        let value = (0..6).fold(0u8, |acc, i| (acc << 1) | u8::from(group.get(i).copied().unwrap_or(false)));
        line.push((DIGRAPH6_OFFSET + value) as char);
    }
    Ok(line)
}

/// A corpus file holding one encoded digraph per line.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    path: PathBuf,
    format: Format,
}

impl CorpusFile {
    /// Opens a corpus, choosing the format from the file extension.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path)?;
        Self::with_format(path, format)
    }

    pub fn with_format(path: impl Into<PathBuf>, format: Format) -> Result<Self> {
        let path = path.into();
        // Fail early on a missing or unreadable file.
        File::open(&path)?;
        Ok(CorpusFile { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Reads the 1-indexed line `line_index`, trimmed.
    pub fn read_line(&self, line_index: usize) -> Result<String> {
        let skip = line_index
            .checked_sub(1)
            .ok_or(CodecError::LineRange { line: line_index })?;
        let reader = BufReader::new(File::open(&self.path)?);
        match reader.lines().nth(skip) {
            Some(line) => {
                let line = line?;
                let line = line.trim();
                if line.is_empty() {
                    Err(CodecError::LineRange { line: line_index })
                } else {
                    Ok(line.to_string())
                }
            }
            None => Err(CodecError::LineRange { line: line_index }),
        }
    }

    /// Decodes the 1-indexed line `line_index`.
    pub fn decode(&self, line_index: usize, name: impl Into<String>) -> Result<Digraph> {
        let line = self.read_line(line_index)?;
        self.format.parse_line(&line, name)
    }

    /// Streams `(line_index, line)` pairs starting from line 1.
    pub fn numbered_lines(&self) -> Result<impl Iterator<Item = io::Result<(usize, String)>>> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l))))
    }
}
