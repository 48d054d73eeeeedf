//! The min/max k_val kings sweep.
//!
//! A base tournament `T_i` is crossed with every tournament of the corpus,
//! order by order, from its own order up to `max_order`. For each product
//! that has kings, the report lists the minimal and maximal king
//! eccentricities and the kings attaining them.

use crate::codec::{parse_bit_triangle, CodecError, CorpusFile, Format};
use crate::king::AnalyzedDigraph;
use crate::product::{Extremum, ProductDigraph};
use crate::{Digraph, Vertex};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Smallest tournament order the sweep accepts.
pub const MIN_ORDER: usize = 3;
/// Largest order with a corpus file.
pub const MAX_ORDER: usize = 10;
/// Non-isomorphic tournaments of orders 3 through 10, one per corpus line.
pub const TOURNAMENT_COUNTS: [usize; 8] = [2, 4, 12, 56, 456, 6880, 191536, 9733056];

const ORDER_DIVIDER: &str = "\t--------------------------------------";
const DEGENERATE_BASE: &str =
    "Tournament either has no kings, an emperor, or order less than 3, no output--";

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("could not load base tournament: {0}")]
    Codec(#[from] CodecError),
    #[error("could not read order {order} corpus {}: {source}", path.display())]
    Corpus {
        order: usize,
        path: PathBuf,
        source: CodecError,
    },
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("order {order} has no corpus file (supported: {min}..={max})")]
    InvalidOrder { order: usize, min: usize, max: usize },
}

/// Tournament corpus files `tourn{n}.txt` in one directory, with the number
/// of lines each is expected to hold.
#[derive(Debug, Clone)]
pub struct Corpus {
    dir: PathBuf,
    sizes: BTreeMap<usize, usize>,
}

impl Corpus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let sizes = (MIN_ORDER..=MAX_ORDER).zip(TOURNAMENT_COUNTS).collect();
        Corpus {
            dir: dir.into(),
            sizes,
        }
    }

    /// Overrides the line count of one order, e.g. for a partial corpus.
    pub fn with_size(mut self, order: usize, size: usize) -> Self {
        self.sizes.insert(order, size);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, order: usize) -> PathBuf {
        self.dir.join(format!("tourn{}.txt", order))
    }

    pub fn size(&self, order: usize) -> Option<usize> {
        self.sizes.get(&order).copied()
    }

    fn size_or_err(&self, order: usize) -> Result<usize, SweepError> {
        self.size(order).ok_or(SweepError::InvalidOrder {
            order,
            min: self.sizes.keys().next().copied().unwrap_or(MIN_ORDER),
            max: self.sizes.keys().next_back().copied().unwrap_or(MAX_ORDER),
        })
    }

    pub fn file(&self, order: usize) -> Result<CorpusFile, CodecError> {
        CorpusFile::with_format(self.path_for(order), Format::BitTriangle)
    }

    /// Decodes tournament `line` of order `order`, named `T{order}_{line}`.
    pub fn load(&self, order: usize, line: usize) -> Result<Digraph, CodecError> {
        self.file(order)?.decode(line, tournament_name(order, line))
    }
}

pub fn tournament_name(order: usize, line: usize) -> String {
    format!("T{}_{}", order, line)
}

/// Sweep settings.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub corpus: Corpus,
    pub output_dir: PathBuf,
    /// Worker threads; 0 lets rayon pick one per core.
    pub workers: usize,
    pub max_order: usize,
    /// Corpus lines read and evaluated per parallel batch.
    pub chunk_size: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            corpus: Corpus::new("digraph_datasets/t_files"),
            output_dir: PathBuf::from("experiment results"),
            workers: 0,
            max_order: MAX_ORDER,
            chunk_size: 1024,
        }
    }
}

/// Extremal kings of one base-by-candidate product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    pub name: String,
    pub min_eccentricity: usize,
    pub min_kings: Vec<Vertex>,
    pub max_eccentricity: usize,
    pub max_kings: Vec<Vertex>,
}

impl fmt::Display for CandidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\t{}:", self.name)?;
        writeln!(
            f,
            "\t\t\tmin_k_val: {}, [{}]",
            self.min_eccentricity,
            self.min_kings.iter().join(", ")
        )?;
        writeln!(
            f,
            "\t\t\tmax_k_val: {}, [{}]",
            self.max_eccentricity,
            self.max_kings.iter().join(", ")
        )?;
        writeln!(f)
    }
}

/// What happened to one candidate tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Reported(CandidateReport),
    /// The candidate has no kings or has an emperor.
    DegenerateCandidate,
    /// The product with the base has no kings.
    DegenerateProduct,
}

/// Crosses `base` with `candidate` and collects the extremal kings.
pub fn evaluate_candidate(base: &AnalyzedDigraph, candidate: Digraph) -> CandidateOutcome {
    let candidate = AnalyzedDigraph::new(candidate);
    if candidate.kings().is_empty() || candidate.has_emperor() {
        return CandidateOutcome::DegenerateCandidate;
    }

    let product = ProductDigraph::of(base, &candidate);
    if product.king_count() == 0 {
        return CandidateOutcome::DegenerateProduct;
    }

    let labels = |extremum: Extremum| {
        product
            .extremal_kings(extremum)
            .into_iter()
            .map(|king| product.product().digraph().vertex(king.vertex).clone())
            .collect::<Vec<_>>()
    };

    CandidateOutcome::Reported(CandidateReport {
        name: candidate.name().to_string(),
        min_eccentricity: product.product().min_eccentricity(),
        min_kings: labels(Extremum::Min),
        max_eccentricity: product.product().max_eccentricity(),
        max_kings: labels(Extremum::Max),
    })
}

/// A base with no kings, an emperor, or order below 3 yields no output.
pub fn is_degenerate_base(base: &AnalyzedDigraph) -> bool {
    base.kings().is_empty() || base.has_emperor() || base.order() < MIN_ORDER
}

/// Counters accumulated over a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub candidates: usize,
    pub decode_failures: usize,
    pub degenerate_candidates: usize,
    pub degenerate_products: usize,
    pub reported: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The base tournament was degenerate; the report holds one line.
    Degenerate { report: PathBuf },
    Completed { report: PathBuf, stats: SweepStats },
}

pub fn report_path(output_dir: &Path, order: usize, line: usize) -> PathBuf {
    output_dir.join(format!(
        "experiment_results_[{}].txt",
        tournament_name(order, line)
    ))
}

/// Runs the sweep for base tournament `base_line` of order `base_order`.
pub fn run_sweep(
    config: &SweepConfig,
    base_order: usize,
    base_line: usize,
) -> Result<SweepOutcome, SweepError> {
    std::fs::create_dir_all(&config.output_dir)?;
    let report = report_path(&config.output_dir, base_order, base_line);

    let base = if base_order < MIN_ORDER {
        None
    } else {
        for order in base_order..=config.max_order.max(base_order) {
            config.corpus.size_or_err(order)?;
        }
        Some(AnalyzedDigraph::new(config.corpus.load(base_order, base_line)?))
    };

    let base = match base {
        Some(base) if !is_degenerate_base(&base) => base,
        _ => {
            log::info!(
                "{} is degenerate, writing empty report",
                tournament_name(base_order, base_line)
            );
            let mut writer = File::create(&report)?;
            writeln!(writer, "{}", DEGENERATE_BASE)?;
            return Ok(SweepOutcome::Degenerate { report });
        }
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    log::info!(
        "sweeping {} against orders {}..={} on {} workers",
        base.name(),
        base_order,
        config.max_order,
        pool.current_num_threads()
    );

    let mut writer = BufWriter::new(File::create(&report)?);
    writeln!(writer, "{} x", base.name())?;

    let mut stats = SweepStats::default();
    for order in base_order..=config.max_order {
        let before = stats.clone();
        sweep_order(config, &pool, &base, order, &mut writer, &mut stats)?;
        writeln!(writer, "{}", ORDER_DIVIDER)?;
        writer.flush()?;
        log::info!(
            "order {}: {} candidates, {} reported",
            order,
            stats.candidates - before.candidates,
            stats.reported - before.reported
        );
    }

    Ok(SweepOutcome::Completed { report, stats })
}

/// Evaluates every candidate of one order in parallel batches and appends
/// their blocks in line order.
fn sweep_order<W: Write>(
    config: &SweepConfig,
    pool: &rayon::ThreadPool,
    base: &AnalyzedDigraph,
    order: usize,
    writer: &mut W,
    stats: &mut SweepStats,
) -> Result<(), SweepError> {
    let size = config.corpus.size_or_err(order)?;
    let corpus_error = |source: CodecError| SweepError::Corpus {
        order,
        path: config.corpus.path_for(order),
        source,
    };
    let corpus = config.corpus.file(order).map_err(corpus_error)?;
    let lines = corpus.numbered_lines().map_err(corpus_error)?.take(size);

    let mut read = 0;
    for batch in &lines.chunks(config.chunk_size.max(1)) {
        let batch: Vec<(usize, String)> = batch.collect::<io::Result<_>>()?;
        read += batch.len();

        let outcomes: Vec<(usize, Result<CandidateOutcome, CodecError>)> = pool.install(|| {
            batch
                .par_iter()
                .map(|(line_index, line)| {
                    let outcome = if line.trim().is_empty() {
                        Err(CodecError::LineRange { line: *line_index })
                    } else {
                        parse_bit_triangle(line, tournament_name(order, *line_index))
                            .map(|candidate| evaluate_candidate(base, candidate))
                    };
                    (*line_index, outcome)
                })
                .collect()
        });

        for (line_index, outcome) in outcomes {
            stats.candidates += 1;
            match outcome {
                Ok(CandidateOutcome::Reported(report)) => {
                    write!(writer, "{}", report)?;
                    stats.reported += 1;
                }
                Ok(CandidateOutcome::DegenerateCandidate) => stats.degenerate_candidates += 1,
                Ok(CandidateOutcome::DegenerateProduct) => stats.degenerate_products += 1,
                Err(e) => {
                    log::warn!(
                        "skipping {}: {}",
                        tournament_name(order, line_index),
                        e
                    );
                    stats.decode_failures += 1;
                }
            }
        }
    }

    if read < size {
        log::warn!(
            "{} ends after {} lines, expected {}",
            corpus.path().display(),
            read,
            size
        );
        stats.candidates += size - read;
        stats.decode_failures += size - read;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::king::analyze;
    use std::fs;
    use tempfile::TempDir;

    fn write_corpus(dir: &Path, order: usize, lines: &[&str]) {
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(dir.join(format!("tourn{}.txt", order)), content).unwrap();
    }

    fn small_corpus() -> (TempDir, SweepConfig) {
        let tmp = TempDir::new().unwrap();
        write_corpus(tmp.path(), 3, &["111", "101"]);
        write_corpus(tmp.path(), 4, &["110111", "111111", "10x"]);
        let config = SweepConfig {
            corpus: Corpus::new(tmp.path()).with_size(3, 2).with_size(4, 3),
            output_dir: tmp.path().join("results"),
            workers: 2,
            max_order: 4,
            chunk_size: 2,
        };
        (tmp, config)
    }

    #[test]
    fn test_known_corpus_sizes() {
        let corpus = Corpus::new("data");
        assert_eq!(corpus.size(3), Some(2));
        assert_eq!(corpus.size(10), Some(9733056));
        assert_eq!(corpus.size(11), None);
        assert_eq!(corpus.path_for(7), Path::new("data").join("tourn7.txt"));
    }

    #[test]
    fn test_candidate_block_format() {
        let report = CandidateReport {
            name: "T4_1".to_string(),
            min_eccentricity: 2,
            min_kings: vec![Vertex::pair(Vertex::Label(1), Vertex::Label(2))],
            max_eccentricity: 5,
            max_kings: vec![
                Vertex::pair(Vertex::Label(1), Vertex::Label(3)),
                Vertex::pair(Vertex::Label(2), Vertex::Label(1)),
            ],
        };
        assert_eq!(
            report.to_string(),
            "\t\tT4_1:\n\t\t\tmin_k_val: 2, [(1, 2)]\n\t\t\tmax_k_val: 5, [(1, 3), (2, 1)]\n\n"
        );
    }

    #[test]
    fn test_emperor_candidates_are_skipped() {
        let base = analyze(parse_bit_triangle("101", "T3_2").unwrap());
        let emperor = parse_bit_triangle("111", "T3_1").unwrap();
        assert_eq!(
            evaluate_candidate(&base, emperor),
            CandidateOutcome::DegenerateCandidate
        );
    }

    #[test]
    fn test_product_of_emperors_is_degenerate() {
        let emperor = analyze(parse_bit_triangle("111111", "T4_2").unwrap());
        assert!(emperor.has_emperor());
        assert!(is_degenerate_base(&emperor));
        // even when crossed directly, the product has nothing to report
        let product = ProductDigraph::of(&emperor, &emperor);
        assert_eq!(product.king_count(), 0);
    }

    #[test]
    fn test_kingless_product_is_skipped() {
        let base = analyze(parse_bit_triangle("101", "T3_2").unwrap());
        let same = parse_bit_triangle("101", "T3_2").unwrap();
        assert_eq!(
            evaluate_candidate(&base, same),
            CandidateOutcome::DegenerateProduct
        );
    }

    #[test]
    fn test_sweep_report_and_stats() {
        let (_tmp, config) = small_corpus();
        let outcome = run_sweep(&config, 3, 2).unwrap();
        let SweepOutcome::Completed { report, stats } = outcome else {
            panic!("expected a completed sweep");
        };

        assert_eq!(
            stats,
            SweepStats {
                candidates: 5,
                decode_failures: 1,
                degenerate_candidates: 2,
                degenerate_products: 1,
                reported: 1,
            }
        );

        let base = analyze(parse_bit_triangle("101", "T3_2").unwrap());
        let CandidateOutcome::Reported(block) =
            evaluate_candidate(&base, parse_bit_triangle("110111", "T4_1").unwrap())
        else {
            panic!("expected T4_1 to be reported");
        };
        assert_eq!(block.name, "T4_1");

        let expected = format!(
            "T3_2 x\n{divider}\n{block}{divider}\n",
            divider = ORDER_DIVIDER,
            block = block
        );
        assert_eq!(fs::read_to_string(report).unwrap(), expected);
    }

    #[test]
    fn test_sweep_output_is_independent_of_workers() {
        let (_tmp, mut config) = small_corpus();
        let first = run_sweep(&config, 3, 2).unwrap();
        let first_text = match &first {
            SweepOutcome::Completed { report, .. } => fs::read_to_string(report).unwrap(),
            SweepOutcome::Degenerate { .. } => panic!("unexpected degenerate base"),
        };

        config.workers = 1;
        config.chunk_size = 1000;
        let second = run_sweep(&config, 3, 2).unwrap();
        let second_text = match &second {
            SweepOutcome::Completed { report, .. } => fs::read_to_string(report).unwrap(),
            SweepOutcome::Degenerate { .. } => panic!("unexpected degenerate base"),
        };
        assert_eq!(first_text, second_text);
    }

    #[test]
    fn test_degenerate_base_writes_single_line() {
        let (_tmp, config) = small_corpus();
        let outcome = run_sweep(&config, 3, 1).unwrap();
        let SweepOutcome::Degenerate { report } = outcome else {
            panic!("an emperor base must be degenerate");
        };
        assert_eq!(
            fs::read_to_string(report).unwrap(),
            format!("{}\n", DEGENERATE_BASE)
        );
    }

    #[test]
    fn test_small_base_order_is_degenerate() {
        let (_tmp, config) = small_corpus();
        assert!(matches!(
            run_sweep(&config, 2, 1).unwrap(),
            SweepOutcome::Degenerate { .. }
        ));
    }

    #[test]
    fn test_unreadable_base_line_aborts() {
        let (_tmp, config) = small_corpus();
        assert!(matches!(
            run_sweep(&config, 4, 3),
            Err(SweepError::Codec(CodecError::Content { found: 'x' }))
        ));
        assert!(matches!(
            run_sweep(&config, 3, 9),
            Err(SweepError::Codec(CodecError::LineRange { line: 9 }))
        ));
    }

    #[test]
    fn test_short_corpus_counts_missing_lines() {
        let (_tmp, mut config) = small_corpus();
        config.corpus = config.corpus.with_size(4, 5);
        let SweepOutcome::Completed { stats, .. } = run_sweep(&config, 3, 2).unwrap() else {
            panic!("expected a completed sweep");
        };
        assert_eq!(stats.candidates, 7);
        assert_eq!(stats.decode_failures, 3);
        assert_eq!(stats.reported, 1);
    }

    #[test]
    fn test_order_outside_corpus_is_rejected() {
        let (_tmp, config) = small_corpus();
        assert!(matches!(
            run_sweep(&config, 11, 1),
            Err(SweepError::InvalidOrder { order: 11, .. })
        ));
        // order 5 is known but its file is absent
        assert!(matches!(
            run_sweep(&config, 5, 1),
            Err(SweepError::Codec(CodecError::Io(_)))
        ));
    }

    #[test]
    fn test_max_order_beyond_corpus_is_rejected_up_front() {
        let (_tmp, mut config) = small_corpus();
        config.max_order = 11;
        assert!(matches!(
            run_sweep(&config, 3, 2),
            Err(SweepError::InvalidOrder { order: 11, .. })
        ));
        assert!(!report_path(&config.output_dir, 3, 2).exists());
    }

    #[test]
    fn test_missing_candidate_corpus_names_the_order() {
        let (tmp, mut config) = small_corpus();
        config.max_order = 5;
        let err = run_sweep(&config, 3, 2).unwrap_err();
        match &err {
            SweepError::Corpus { order, path, source } => {
                assert_eq!(*order, 5);
                assert_eq!(path, &tmp.path().join("tourn5.txt"));
                assert!(matches!(source, CodecError::Io(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().starts_with("could not read order 5 corpus"));
    }
}
