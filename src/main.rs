//! Command-line front end (out of core scope, per design — an "external
//! collaborator" consuming the core's query API rather than part of it).
//! Three subcommands: `compress`, `benchmark`, `stats`. Flag style and the
//! phase-timing/quiet-logging idiom are carried over from this crate's
//! previous CLI: `Instant`-based timers, `println!` gated behind `-q`.

use clap::{Parser, Subcommand, ValueEnum};
use sfkit::compress::{compress_bp, compress_dag};
use sfkit::config::BuildConfig;
use sfkit::fileformat::FileTreeSequenceReader;
use sfkit::forest::SuccinctForest;
use sfkit::ids::SampleSet;
use sfkit::io::{load_bp, load_dag, save_bp, save_dag};
use sfkit::util::timing::{log_if, Stopwatch};
use sfkit::{Result, SfkitError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sfkit-cli", version, about = "Compress and query succinct forests of tree sequences")]
struct Cli {
    /// Suppress phase timing and progress output.
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CompressFormat {
    Dag,
    Bp,
    Both,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LoadFormat {
    Dag,
    Bp,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a tree-sequence text file into one or both encodings.
    Compress {
        /// Input tree-sequence file.
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Which encoding(s) to produce.
        #[arg(short = 'f', long, value_enum, default_value = "dag")]
        format: CompressFormat,
        /// Output path. With `--format both`, DAG goes to `<output>.dag` and
        /// BP to `<output>.bp`.
        #[arg(short = 'w', long)]
        output: PathBuf,
    },
    /// Repeatedly run core queries against a compressed file and report timings.
    Benchmark {
        /// Compressed file produced by `compress`.
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Which encoding `input` holds.
        #[arg(short = 'f', long, value_enum, default_value = "dag")]
        format: LoadFormat,
        /// Number of repeated query passes.
        #[arg(short = 'r', long, default_value_t = 10)]
        repetitions: u32,
        /// Restrict the query sample set to the first N samples (default: all).
        #[arg(short = 'n', long)]
        num_samples: Option<u32>,
    },
    /// Compute population-genetics statistics over a compressed file.
    Stats {
        /// Compressed file produced by `compress`.
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Which encoding `input` holds.
        #[arg(short = 'f', long, value_enum, default_value = "dag")]
        format: LoadFormat,
        /// Newline-delimited sample ids defining the primary sample set.
        #[arg(short = 'm', long)]
        sample_set: PathBuf,
        /// Optional second sample set; enables divergence/Fst/F2.
        #[arg(short = 'b', long)]
        sample_set_b: Option<PathBuf>,
        /// Write the statistics table here instead of stdout.
        #[arg(short = 'w', long)]
        output: Option<PathBuf>,
    },
}

fn read_sample_set(path: &PathBuf, overall_num_samples: u32) -> Result<SampleSet> {
    let text = std::fs::read_to_string(path).map_err(|source| SfkitError::Io { path: path.display().to_string(), source })?;
    let mut set = SampleSet::new(overall_num_samples);
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let id: u32 = line
            .parse()
            .map_err(|_| SfkitError::InputViolatesContract { detail: format!("not a sample id: `{line}`") })?;
        set.add(id);
    }
    Ok(set)
}

fn run_compress(input: PathBuf, format: CompressFormat, output: PathBuf, quiet: bool) -> Result<()> {
    let sw = Stopwatch::start();
    let reader = FileTreeSequenceReader::load(&input)?;
    log_if(!quiet, format!("read {} in {:.3}s", input.display(), sw.elapsed_secs()));
    let config = BuildConfig::default();

    if matches!(format, CompressFormat::Dag | CompressFormat::Both) {
        let sw = Stopwatch::start();
        let (forest, sequence) = compress_dag(&reader, &config)?;
        let path = match format {
            CompressFormat::Both => output.with_extension("dag"),
            _ => output.clone(),
        };
        save_dag(&path, &forest, &sequence)?;
        log_if(
            !quiet,
            format!("compressed DAG ({} nodes) to {} in {:.3}s", forest.num_nodes(), path.display(), sw.elapsed_secs()),
        );
    }
    if matches!(format, CompressFormat::Bp | CompressFormat::Both) {
        let sw = Stopwatch::start();
        let (forest, sequence) = compress_bp(&reader, &config)?;
        let path = match format {
            CompressFormat::Both => output.with_extension("bp"),
            _ => output.clone(),
        };
        save_bp(&path, &forest, &sequence)?;
        log_if(
            !quiet,
            format!("compressed BP ({} nodes) to {} in {:.3}s", forest.num_nodes(), path.display(), sw.elapsed_secs()),
        );
    }
    Ok(())
}

fn run_benchmark(input: PathBuf, format: LoadFormat, repetitions: u32, num_samples: Option<u32>, quiet: bool) -> Result<()> {
    let sw = Stopwatch::start();
    macro_rules! bench_with {
        ($sf:expr) => {{
            let sf = $sf;
            let mut all = sf.all_samples();
            if let Some(n) = num_samples {
                let mut restricted = SampleSet::new(all.overall_num_samples());
                for id in all.iter().take(n as usize) {
                    restricted.add(id);
                }
                all = restricted;
            }
            log_if(!quiet, format!("loaded in {:.3}s, querying {} samples", sw.elapsed_secs(), all.popcount()));

            let sw = Stopwatch::start();
            for rep in 0..repetitions {
                let pi = sf.diversity(&all);
                let s = sf.num_segregating_sites(&all);
                let d = sf.tajimas_d(&all);
                log_if(!quiet, format!("rep {rep}: diversity={pi:.6} segregating_sites={s} tajimas_d={d:?}"));
            }
            log_if(
                !quiet,
                format!("{repetitions} repetitions in {:.3}s ({:.3}s/rep)", sw.elapsed_secs(), sw.elapsed_secs() / repetitions.max(1) as f64),
            );
        }};
    }

    match format {
        LoadFormat::Dag => {
            let (forest, sequence) = load_dag(&input)?;
            bench_with!(SuccinctForest::new(forest, sequence));
        }
        LoadFormat::Bp => {
            let (forest, sequence) = load_bp(&input)?;
            bench_with!(SuccinctForest::new(forest, sequence));
        }
    }
    Ok(())
}

fn run_stats(
    input: PathBuf,
    format: LoadFormat,
    sample_set: PathBuf,
    sample_set_b: Option<PathBuf>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let sw = Stopwatch::start();

    macro_rules! stats_with {
        ($sf:expr) => {{
            let sf = $sf;
            let overall = sf.all_samples().overall_num_samples();
            let a = read_sample_set(&sample_set, overall)?;
            log_if(!quiet, format!("loaded in {:.3}s", sw.elapsed_secs()));

            let mut lines = Vec::new();
            lines.push(format!("diversity\t{}", sf.diversity(&a)));
            lines.push(format!("segregating_sites\t{}", sf.num_segregating_sites(&a)));
            lines.push(format!("tajimas_d\t{}", sf.tajimas_d(&a).map(|d| d.to_string()).unwrap_or_else(|| "NA".into())));
            if let Some(b_path) = sample_set_b {
                let b = read_sample_set(&b_path, overall)?;
                lines.push(format!("divergence\t{}", sf.divergence(&a, &b)));
                lines.push(format!("fst\t{}", sf.fst(&a, &b).map(|v| v.to_string()).unwrap_or_else(|| "NA".into())));
                lines.push(format!("f2\t{}", sf.f2(&a, &b)?));
            }
            lines.join("\n")
        }};
    }

    let table = match format {
        LoadFormat::Dag => {
            let (forest, sequence) = load_dag(&input)?;
            stats_with!(SuccinctForest::new(forest, sequence))
        }
        LoadFormat::Bp => {
            let (forest, sequence) = load_bp(&input)?;
            stats_with!(SuccinctForest::new(forest, sequence))
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, table).map_err(|source| SfkitError::Io { path: path.display().to_string(), source })?;
            log_if(!quiet, format!("wrote stats to {} in {:.3}s", path.display(), sw.elapsed_secs()));
        }
        None => println!("{table}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Compress { input, format, output } => run_compress(input, format, output, cli.quiet),
        Command::Benchmark { input, format, repetitions, num_samples } => {
            run_benchmark(input, format, repetitions, num_samples, cli.quiet)
        }
        Command::Stats { input, format, sample_set, sample_set_b, output } => {
            run_stats(input, format, sample_set, sample_set_b, output, cli.quiet)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sfkit-cli: {e}");
            ExitCode::FAILURE
        }
    }
}
