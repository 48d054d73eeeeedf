use clap::Parser;
use digraph_kings::experiment::{run_sweep, Corpus, SweepConfig, SweepOutcome, MAX_ORDER, MIN_ORDER};
use std::path::PathBuf;

/// Min/max k_val kings sweep over tensor products of tournaments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Order of the base tournament
    #[arg(short, long)]
    order: usize,

    /// 1-indexed line of the base tournament in its corpus file
    #[arg(short, long)]
    line: usize,

    /// Directory holding tourn3.txt .. tourn10.txt
    #[arg(long, default_value = "digraph_datasets/t_files")]
    corpus: PathBuf,

    /// Directory the report is written to
    #[arg(long, default_value = "experiment results")]
    output_dir: PathBuf,

    /// Largest candidate order to sweep
    #[arg(long, default_value_t = MAX_ORDER)]
    max_order: usize,

    /// Worker threads (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// Corpus lines evaluated per parallel batch
    #[arg(long, default_value_t = 1024)]
    chunk_size: usize,

    /// Override the expected line count of an order, as ORDER=COUNT
    #[arg(long = "size", value_parser = parse_size_override)]
    sizes: Vec<(usize, usize)>,
}

fn parse_size_override(s: &str) -> Result<(usize, usize), String> {
    let (order, count) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid size override: {}. Use ORDER=COUNT", s))?;
    let order = order.trim().parse().map_err(|e| format!("Invalid order: {}", e))?;
    let count = count.trim().parse().map_err(|e| format!("Invalid count: {}", e))?;
    Ok((order, count))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("Digraph Kings Sweep");
    println!("==========================================================");
    println!();

    if !(MIN_ORDER..=MAX_ORDER).contains(&args.max_order) {
        eprintln!("Error: max_order must be in [{}, {}].", MIN_ORDER, MAX_ORDER);
        std::process::exit(1);
    }

    let corpus = args
        .sizes
        .iter()
        .fold(Corpus::new(&args.corpus), |corpus, &(order, count)| {
            corpus.with_size(order, count)
        });

    let config = SweepConfig {
        corpus,
        output_dir: args.output_dir,
        workers: args.workers,
        max_order: args.max_order,
        chunk_size: args.chunk_size,
    };

    println!("Base tournament: T{}_{}", args.order, args.line);
    println!("Corpus directory: {}", config.corpus.dir().display());
    println!("Candidate orders: {}..={}", args.order, config.max_order);
    println!();

    let start_time = std::time::Instant::now();
    match run_sweep(&config, args.order, args.line) {
        Ok(SweepOutcome::Degenerate { report }) => {
            println!("Tournament either has no kings, an emperor, or order less than 3.");
            println!("Report: {}", report.display());
        }
        Ok(SweepOutcome::Completed { report, stats }) => {
            let elapsed = start_time.elapsed();
            println!("==========================================================");
            println!("SWEEP COMPLETE");
            println!("==========================================================");
            println!("Candidates read: {}", stats.candidates);
            println!("Products reported: {}", stats.reported);
            println!("Candidates without kings or with an emperor: {}", stats.degenerate_candidates);
            println!("Products without kings: {}", stats.degenerate_products);
            println!("Undecodable lines skipped: {}", stats.decode_failures);
            println!("Computation time: {:.3}s", elapsed.as_secs_f64());
            println!("Report: {}", report.display());
        }
        Err(e) => {
            eprintln!("Error running sweep: {}", e);
            std::process::exit(1);
        }
    }
}
