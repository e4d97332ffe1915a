use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use jacobi_heat::output::write_report;
use jacobi_heat::timing::Timed;
use jacobi_heat::{RelaxationEngine, SolverConfig, Strategy};

const BENCH_WARMUP: usize = 2;

#[derive(Parser)]
#[command(name = "jacobi-heat")]
#[command(about = "Steady-state 2D heat diffusion by Jacobi relaxation")]
#[command(version)]
struct Cli {
    /// Interior rows.
    m: Option<usize>,
    /// Interior columns.
    n: Option<usize>,
    /// Convergence tolerance on the largest change per sweep.
    tol: Option<f64>,

    /// TOML job file; positional arguments and flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Execution strategy: single, rayon or barrier.
    #[arg(short, long)]
    solver: Option<Strategy>,

    /// Worker threads for the parallel strategies.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Give up after this many sweeps.
    #[arg(long)]
    max_iter: Option<usize>,

    #[arg(long)]
    left: Option<f64>,
    #[arg(long)]
    right: Option<f64>,
    #[arg(long)]
    top: Option<f64>,
    #[arg(long)]
    bottom: Option<f64>,
    /// Initial interior value.
    #[arg(long)]
    fill: Option<f64>,

    /// Write the report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only print the echo and iteration lines.
    #[arg(long)]
    no_grid: bool,

    /// Time every strategy over this many runs instead of printing a report.
    #[arg(long, value_name = "RUNS")]
    bench: Option<usize>,
}

impl Cli {
    fn solver_config(&self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path)?,
            None => match (self.m, self.n, self.tol) {
                (Some(m), Some(n), Some(tol)) => SolverConfig::new(m, n, tol),
                _ => bail!("expected positional arguments M N TOL (or --config FILE)"),
            },
        };

        if let Some(m) = self.m {
            config.m = m;
        }
        if let Some(n) = self.n {
            config.n = n;
        }
        if let Some(tol) = self.tol {
            config.tol = tol;
        }
        if let Some(strategy) = self.solver {
            config.strategy = strategy;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if self.max_iter.is_some() {
            config.max_iterations = self.max_iter;
        }

        let boundary = &mut config.boundary;
        for (slot, value) in [
            (&mut boundary.left, self.left),
            (&mut boundary.right, self.right),
            (&mut boundary.top, self.top),
            (&mut boundary.bottom, self.bottom),
            (&mut boundary.fill, self.fill),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.solver_config()?;

    if let Some(runs) = cli.bench {
        if runs == 0 {
            bail!("--bench needs at least one run");
        }
        println!("=== Jacobi relaxation benchmark ===");
        println!(
            "m: {}, n: {}, tol: {}, runs: {}\n",
            config.m, config.n, config.tol, runs
        );
        for strategy in Strategy::ALL {
            let config = config.clone().with_strategy(strategy);
            run_benchmark(&strategy.to_string(), runs, || run_once(&config))?;
        }
        println!("=== Benchmark complete ===");
        return Ok(());
    }

    let solution = {
        let _t = Timed::info(format!("Solve {}x{}", config.m, config.n));
        RelaxationEngine::init(&config)?.run()?
    };

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_report(&mut BufWriter::new(file), &config, &solution, !cli.no_grid)?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_report(&mut out, &config, &solution, !cli.no_grid)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn run_once(config: &SolverConfig) -> anyhow::Result<(Duration, usize)> {
    let engine = RelaxationEngine::init(config)?;
    let start = Instant::now();
    let solution = engine.run()?;
    Ok((start.elapsed(), solution.iterations))
}

fn run_benchmark<F>(name: &str, runs: usize, mut bench_fn: F) -> anyhow::Result<()>
where
    F: FnMut() -> anyhow::Result<(Duration, usize)>,
{
    println!("{}:", name);

    for _ in 0..BENCH_WARMUP {
        bench_fn()?;
    }

    let mut times = Vec::with_capacity(runs);
    for i in 0..runs {
        let (duration, iterations) = bench_fn()?;
        times.push(duration);
        println!("  run {:2}: {:?} ({} iterations)", i + 1, duration, iterations);
    }

    times.sort();
    let median = times[runs / 2];
    let avg = times.iter().sum::<Duration>() / runs as u32;
    let min = times[0];
    let max = times[runs - 1];

    println!("  ---");
    println!("  min:    {:?}", min);
    println!("  median: {:?}", median);
    println!("  mean:   {:?}", avg);
    println!("  max:    {:?}", max);
    println!();
    Ok(())
}
