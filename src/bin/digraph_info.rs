use clap::Parser;
use digraph_kings::{
    codec::{CorpusFile, Format},
    king::AnalyzedDigraph,
    product::{Extremum, ProductDigraph},
    summary::{describe_bound, describe_extremal_kings, digraph_characteristics, king_characteristics},
};
use std::path::{Path, PathBuf};

/// Kings, Dv / Cv invariants and tensor products of corpus digraphs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Corpus file of the (left) digraph
    #[arg(short, long)]
    input: PathBuf,

    /// 1-indexed line of the digraph in its corpus file
    #[arg(short, long)]
    line: usize,

    /// Corpus file of a right factor; enables the product report
    #[arg(long)]
    other: Option<PathBuf>,

    /// 1-indexed line of the right factor (defaults to --line)
    #[arg(long)]
    other_line: Option<usize>,

    /// Encoding of the corpus files: bit-triangle or digraph6 (default: by extension)
    #[arg(short, long)]
    format: Option<Format>,

    /// Compute the closed-walk lengths Dv of every king
    #[arg(long)]
    dv: bool,

    /// Compute the simple-cycle lengths Cv of every king
    #[arg(long)]
    cv: bool,

    /// List tournament kings under the strict eccentricity <= 2 rule
    #[arg(long)]
    tournament_rules: bool,
}

fn load(path: &Path, line: usize, format: Option<Format>, dv: bool, cv: bool) -> AnalyzedDigraph {
    let corpus = match format {
        Some(format) => CorpusFile::with_format(path, format),
        None => CorpusFile::open(path),
    };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "D".to_string());
    let name = format!("{}_{}", stem, line);

    match corpus.and_then(|corpus| corpus.decode(line, name)) {
        Ok(digraph) => AnalyzedDigraph::new(digraph).compute_cycle_invariants(dv, cv),
        Err(e) => {
            eprintln!("Error loading line {} of {}: {}", line, path.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_report(analyzed: &AnalyzedDigraph, tournament_rules: bool) {
    for line in digraph_characteristics(analyzed, tournament_rules) {
        println!("{}", line);
    }
    let kings = king_characteristics(analyzed, tournament_rules);
    if !kings.is_empty() {
        println!("kings:");
        for line in kings {
            println!("  {}", line);
        }
    }
    println!();
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("Digraph Kings Report");
    println!("==========================================================");
    println!();

    let left = load(&args.input, args.line, args.format, args.dv, args.cv);
    print_report(&left, args.tournament_rules);

    let Some(other) = &args.other else {
        return;
    };

    let right = load(
        other,
        args.other_line.unwrap_or(args.line),
        args.format,
        args.dv,
        args.cv,
    );
    print_report(&right, args.tournament_rules);

    let start_time = std::time::Instant::now();
    let product = ProductDigraph::of(&left, &right);
    let elapsed = start_time.elapsed();

    println!("==========================================================");
    println!("PRODUCT {}", product.name());
    println!("==========================================================");
    println!("order: {}", product.product().order());
    println!("size: {}", product.product().digraph().size());
    println!("kings: {}", product.king_count());
    println!("Computation time: {:.3} ms", elapsed.as_secs_f64() * 1000.0);
    println!();

    for extremum in [Extremum::Min, Extremum::Max] {
        for line in describe_extremal_kings(&product, extremum) {
            println!("{}", line);
        }
        println!();
    }
    println!("{}", describe_bound(&product));
}
