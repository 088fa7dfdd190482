use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use parhist_common::Config;
use parhist_core::{
    available_workers, export_csv, export_json, print_summary, write_text, Coordinator,
    HistogramReport, RunOptions,
};
use std::path::{Path, PathBuf};

fn parse_positive(s: &str) -> Result<usize, String> { // reject 0 at parse time
    let v: usize = s.parse().map_err(|_| format!("not a positive integer: {s}"))?;
    if v >= 1 { Ok(v) } else { Err(format!("must be at least 1, got {v}")) }
}

#[derive(Parser)]
#[command(name = "parhist", version, about = "Parallel exact histogram of a numeric dataset")]
struct Cli {
    /// Log verbosity (trace, debug, info, warn, error). Logs go to stderr.
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

impl Format {
    fn from_config(s: &str) -> anyhow::Result<Self> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| anyhow::anyhow!("unknown output format in config: {s} (use text, json or csv)"))
    }

    fn extension(self) -> &'static str {
        match self {
            Format::Text => "txt",
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the histogram of an input file (`-` reads stdin)
    Run {
        input: PathBuf,
        /// Number of workers the dataset is split across
        #[arg(short, long, value_parser = parse_positive)]
        workers: Option<usize>,
        /// Cap on OS threads backing the workers
        #[arg(long, value_parser = parse_positive)]
        threads: Option<usize>,
        /// Fixed lower bound (needs --max)
        #[arg(long, requires = "max", allow_hyphen_values = true)]
        min: Option<f64>,
        /// Fixed upper bound (needs --min)
        #[arg(long, requires = "min", allow_hyphen_values = true)]
        max: Option<f64>,
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print run summary on stderr
        #[arg(long)]
        summary: bool,
    },
    /// Show the effective configuration, or write the defaults with --init
    Config {
        #[arg(long)]
        init: bool,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { input, workers, threads, min, max, format, output, summary } => {
            let config = Config::load()?;
            run(&input, &config, workers, threads, min.zip(max), format, output, summary)
        }
        Commands::Config { init } => run_config(init),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "parhist", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    input: &Path,
    config: &Config,
    workers: Option<usize>,
    threads: Option<usize>,
    range: Option<(f64, f64)>,
    format: Option<Format>,
    output: Option<PathBuf>,
    summary: bool,
) -> anyhow::Result<()> {
    let opts = RunOptions {
        workers: workers.or(config.run.workers).unwrap_or_else(available_workers),
        threads: threads.or(config.run.threads),
        range: match range {
            Some(r) => Some(r),
            None => config.range.bounds()?,
        },
    };
    let format = match format {
        Some(f) => f,
        None => Format::from_config(&config.output.format)?,
    };
    tracing::debug!(?opts, ?format, input = %input.display(), "starting run");

    let report = Coordinator::new(opts)?.run_path(input)?;
    if summary {
        print_summary(&report);
    }
    emit(&report, format, output, config)
}

fn emit(report: &HistogramReport, format: Format, output: Option<PathBuf>, config: &Config) -> anyhow::Result<()> {
    let precision = config.output.precision;
    // text goes to stdout unless -o is given; exports always land in a file
    let out_path = match (format, output) {
        (_, Some(p)) => p,
        (Format::Text, None) => {
            let stdout = std::io::stdout();
            write_text(&mut stdout.lock(), report, precision)?;
            return Ok(());
        }
        (f, None) => Path::new(&config.output.output_dir).join(format!("histogram.{}", f.extension())),
    };
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    match format {
        Format::Text => {
            let mut file = std::fs::File::create(&out_path)?;
            write_text(&mut file, report, precision)?;
        }
        Format::Json => export_json(&out_path, report)?,
        Format::Csv => export_csv(&out_path, report)?,
    }
    eprintln!("Histogram written to {}", out_path.display());
    Ok(())
}

fn run_config(init: bool) -> anyhow::Result<()> {
    if init {
        let path = Config::default().save()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }
    let config = Config::load()?;
    println!("# {}", Config::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}
