use clap::Parser;
use digraph_kings::codec::{encode_bit_triangle, encode_digraph6, Format, DIGRAPH6_MAX_ORDER};
use digraph_kings::king::AnalyzedDigraph;
use digraph_kings::Digraph;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Random corpus generator for the digraph kings tools.
///
/// Writes one encoded digraph per line, in the same formats the sweep and
/// info tools read:
///
/// - bit-triangle: random tournaments on vertices 1..n, one bit per pair
///   (i, j) with i < j, '1' meaning i -> j
/// - digraph6: random digraphs with arc probability `density`, optionally
///   with self-loops
///
/// A fixed `--seed` reproduces the same file.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate random tournaments or digraphs for the digraph kings tools"
)]
struct Args {
    /// Order of every generated digraph
    #[arg(short, long)]
    order: usize,

    /// Number of lines to write
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Output encoding: bit-triangle (tournaments) or digraph6 (digraphs)
    #[arg(short, long, default_value = "bit-triangle")]
    format: Format,

    /// Arc probability for digraph6 output
    #[arg(long, default_value_t = 0.35)]
    density: f64,

    /// Allow self-loops in digraph6 output
    #[arg(long)]
    loops: bool,

    /// Only keep tournaments that have kings and no emperor
    #[arg(long)]
    skip_degenerate: bool,

    /// Random seed (if omitted, uses entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Output file path
    #[arg(long)]
    output: PathBuf,
}

/// Orient every pair of `1..=n` uniformly at random
fn random_tournament<R: Rng>(n: usize, name: String, rng: &mut R) -> Digraph {
    let mut arcs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for u in 1..n {
        for v in (u + 1)..=n {
            if rng.gen::<bool>() {
                arcs.push((u, v));
            } else {
                arcs.push((v, u));
            }
        }
    }
    Digraph::from_labels(name, 1..=n, arcs)
}

/// Each ordered pair becomes an arc with probability `density`
fn random_digraph<R: Rng>(n: usize, density: f64, loops: bool, name: String, rng: &mut R) -> Digraph {
    let mut arcs = Vec::new();
    for u in 0..n {
        for v in 0..n {
            if u == v && !loops {
                continue;
            }
            if rng.gen::<f64>() < density {
                arcs.push((u, v));
            }
        }
    }
    Digraph::from_labels(name, 0..n, arcs)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.order == 0 {
        eprintln!("Error: order must be positive.");
        std::process::exit(1);
    }
    if !(0.0..=1.0).contains(&args.density) {
        eprintln!("Error: density must be in [0,1].");
        std::process::exit(1);
    }
    if args.format == Format::Digraph6 && args.order > DIGRAPH6_MAX_ORDER {
        eprintln!("Error: digraph6 supports orders up to {}.", DIGRAPH6_MAX_ORDER);
        std::process::exit(1);
    }
    if args.format == Format::BitTriangle && args.order < 2 {
        eprintln!("Error: bit-triangle tournaments need order at least 2.");
        std::process::exit(1);
    }

    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let seed: u64 = rand::thread_rng().gen();
            StdRng::seed_from_u64(seed)
        }
    };

    let file = match File::create(&args.output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error creating {}: {}", args.output.display(), e);
            std::process::exit(1);
        }
    };
    let mut writer = BufWriter::new(file);

    let mut written = 0;
    let mut rejected = 0;
    let mut king_total = 0;
    // bounded so a degenerate-only setting cannot loop forever
    let max_attempts = args.count.saturating_mul(100).max(100);

    for attempt in 0..max_attempts {
        if written == args.count {
            break;
        }
        let name = format!("R{}_{}", args.order, attempt + 1);
        let digraph = match args.format {
            Format::BitTriangle => random_tournament(args.order, name, &mut rng),
            Format::Digraph6 => random_digraph(args.order, args.density, args.loops, name, &mut rng),
        };

        let analyzed = AnalyzedDigraph::new(digraph);
        if args.skip_degenerate && (analyzed.kings().is_empty() || analyzed.has_emperor()) {
            rejected += 1;
            continue;
        }

        let encoded = match args.format {
            Format::BitTriangle => encode_bit_triangle(analyzed.digraph()),
            Format::Digraph6 => encode_digraph6(analyzed.digraph()),
        };
        let result = encoded.and_then(|line| writeln!(writer, "{}", line).map_err(Into::into));
        if let Err(e) = result {
            eprintln!("Error writing {}: {}", args.output.display(), e);
            std::process::exit(1);
        }
        written += 1;
        king_total += analyzed.king_count();
    }

    if let Err(e) = writer.flush() {
        eprintln!("Error writing {}: {}", args.output.display(), e);
        std::process::exit(1);
    }

    println!("Generated corpus:");
    println!("  order = {}", args.order);
    println!("  format = {:?}", args.format);
    if args.format == Format::Digraph6 {
        println!("  density = {:.3}, loops = {}", args.density, args.loops);
    }
    if let Some(seed) = args.seed {
        println!("  seed = {}", seed);
    }
    println!("  lines written = {} (requested {})", written, args.count);
    if args.skip_degenerate {
        println!("  degenerate digraphs rejected = {}", rejected);
    }
    if written > 0 {
        println!("  mean king count = {:.3}", king_total as f64 / written as f64);
    }
    println!("  output file: {:?}", args.output);
}
