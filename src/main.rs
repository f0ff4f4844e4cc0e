use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ternary_carpet::config::{default_workers, DEFAULT_DEPTH};
use ternary_carpet::{compare, output, reduction, visualizer, RunConfig, Strategy};

#[derive(Parser)]
#[command(name = "carpet")]
#[command(about = "Ternary carpet generator with sequential, parallel and distributed strategies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a carpet and write it as a text grid
    Render(RenderArgs),
    /// Run every strategy, report timings and check they agree
    Compare(GridArgs),
    /// Distributed sum of an integer array
    Sum(SumArgs),
    /// Render an existing text grid to PNG
    View(ViewArgs),
}

#[derive(Args)]
struct GridArgs {
    /// Recursion depth; the grid side is 3^depth
    #[arg(long, env = "CARPET_DEPTH", default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Explicit grid side (a power of three); takes precedence over --depth
    #[arg(long)]
    side: Option<usize>,

    /// Threads for the parallel strategy, ranks for the distributed one
    #[arg(long, env = "CARPET_WORKERS")]
    workers: Option<usize>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    grid: GridArgs,

    #[arg(long, value_enum, default_value_t = Strategy::Sequential)]
    strategy: Strategy,

    /// Text grid destination
    #[arg(long, default_value = "result.txt")]
    output: PathBuf,

    /// Also render a PNG here
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pixels per cell in the PNG
    #[arg(long, default_value_t = 4)]
    cell_px: u32,
}

#[derive(Args)]
struct SumArgs {
    /// Comma-separated values; defaults to 1..=10
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    values: Vec<i64>,

    #[arg(long, env = "CARPET_WORKERS")]
    workers: Option<usize>,

    #[arg(long, default_value = "result.txt")]
    output: PathBuf,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long, default_value = "result.txt")]
    input: PathBuf,

    #[arg(long, default_value = "carpet.png")]
    png: PathBuf,

    #[arg(long, default_value_t = 4)]
    cell_px: u32,
}

impl GridArgs {
    fn run_config(&self, strategy: Strategy) -> RunConfig {
        RunConfig {
            depth: self.depth,
            side: self.side,
            workers: self.workers.unwrap_or_else(default_workers),
            strategy,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ternary_carpet=info,carpet=info")),
        )
        .init();

    match Cli::parse().command {
        Command::Render(args) => render(args),
        Command::Compare(args) => compare_strategies(args),
        Command::Sum(args) => sum(args),
        Command::View(args) => view(args),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let config = args.grid.run_config(args.strategy);
    let spec = config.grid_spec()?;
    info!(
        depth = spec.depth(),
        side = spec.side(),
        strategy = %config.strategy,
        workers = config.workers,
        "starting carpet"
    );
    let grid = config.strategy.run(spec, config.workers)?;

    output::write_grid(&args.output, &grid)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), present = grid.count_present(), "grid written");

    if let Some(png) = args.png {
        visualizer::render_png(&grid, &png, args.cell_px)
            .with_context(|| format!("rendering {}", png.display()))?;
        info!(path = %png.display(), "image written");
    }
    Ok(())
}

fn compare_strategies(args: GridArgs) -> Result<()> {
    let config = args.run_config(Strategy::Sequential);
    let spec = config.grid_spec()?;
    let comparison = compare(spec, config.workers)?;
    println!(
        "depth {} ({}x{}), {} workers: all strategies agree, {} cells present",
        spec.depth(),
        spec.side(),
        spec.side(),
        config.workers,
        comparison.grid.count_present()
    );
    for timing in &comparison.timings {
        println!("  {:<12} {:?}", timing.strategy.name(), timing.elapsed);
    }
    Ok(())
}

fn sum(args: SumArgs) -> Result<()> {
    let values = if args.values.is_empty() {
        (1..=10).collect()
    } else {
        args.values
    };
    let workers = args.workers.unwrap_or_else(default_workers);
    let report = reduction::sum(&values, workers)?;
    println!("Global Sum: {}", report.total);
    output::write_sum(&args.output, report.total)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}

fn view(args: ViewArgs) -> Result<()> {
    let grid = output::read_grid_path(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    visualizer::render_png(&grid, &args.png, args.cell_px)
        .with_context(|| format!("rendering {}", args.png.display()))?;
    info!(side = grid.side(), path = %args.png.display(), "image written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_config(args: &[&str]) -> RunConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Render(render) = cli.command else {
            panic!("expected the render command");
        };
        render.grid.run_config(render.strategy)
    }

    #[test]
    fn side_wins_over_depth_from_flag_or_env() {
        let config = render_config(&["carpet", "render", "--depth", "3", "--side", "9"]);
        assert_eq!(config.grid_spec().unwrap().depth(), 2);

        std::env::set_var("CARPET_DEPTH", "3");
        let from_env = render_config(&["carpet", "render", "--side", "9"]);
        let depth_only = render_config(&["carpet", "render", "--workers", "2"]);
        std::env::remove_var("CARPET_DEPTH");

        assert_eq!(from_env.grid_spec().unwrap().depth(), 2);
        assert_eq!(depth_only.grid_spec().unwrap().depth(), 3);
    }
}
