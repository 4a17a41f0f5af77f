use argh::FromArgs;
use env_logger::Env;
use map_bench_harness::analysis::analyze::run_analysis;
use map_bench_harness::plot::render::run_plot;
use map_bench_harness::runner::run::run_sweep;
use map_bench_harness::{HarnessConfig, HarnessError, Workspace};
use std::path::PathBuf;

/// Benchmark harness for map containers
#[derive(FromArgs, Debug)]
struct Args {
    /// workspace holding raw_data/, analysis.json and plots/ (default: .)
    #[argh(option, short = 'd', default = "PathBuf::from(\".\")")]
    dir: PathBuf,

    /// JSON settings file overriding the defaults
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Bench(BenchArgs),
    Analyze(AnalyzeArgs),
    Plot(PlotArgs),
}

/// Run the benchmark program across the parameter sweep
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "bench")]
struct BenchArgs {
    /// benchmark executable, invoked as `<program> <nmax> <repeats> <count>`
    #[argh(positional)]
    program: PathBuf,
}

/// Aggregate raw results into analysis.json
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "analyze")]
struct AnalyzeArgs {}

/// Render one SVG per operation from analysis.json
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "plot")]
struct PlotArgs {}

fn main() -> Result<(), HarnessError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    let workspace = Workspace::new(&args.dir);

    match args.command {
        Command::Bench(bench) => {
            let written = run_sweep(&bench.program, &config.runner, &workspace)?;
            println!(
                "Stored {} raw results in {}",
                written.len(),
                workspace.raw_data_dir().display()
            );
        }
        Command::Analyze(_) => {
            let analysis = run_analysis(&config.analysis, &workspace)?;
            println!(
                "Wrote {} aggregate records to {}",
                analysis.data.len(),
                workspace.analysis_file().display()
            );
        }
        Command::Plot(_) => {
            let written = run_plot(&config.plot, &workspace)?;
            for path in written {
                println!("Plot saved: {}", path.display());
            }
        }
    }
    Ok(())
}
