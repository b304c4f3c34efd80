//! Grid-world planning with Bayes-Adaptive Monte Carlo Planning.
//!
//! Runs plan-act-observe episodes in a grid world whose move dynamics are
//! unknown to the agent, and optionally saves each episode as JSON.

mod episode;

use anyhow::{bail, Context, Result};
use bamcp_grid::{Cell, GridConfig, GridWorld};
use bamcp_search::{Bamcp, BamcpConfig, Ucb1};
use clap::{Args, Parser, Subcommand};
use episode::{run_episode, EpisodeRecord};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// BAMCP grid-world agent.
#[derive(Parser)]
#[command(name = "bamcp-grid")]
#[command(about = "Plan and act in a grid world with unknown dynamics")]
struct Cli {
    /// Log every search and belief reset.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play episodes: plan, act in the real grid, observe, repeat.
    Run {
        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Number of episodes.
        #[arg(short, long, default_value = "1")]
        episodes: usize,

        /// Maximum number of real steps per episode.
        #[arg(long, default_value = "20")]
        steps: usize,

        /// Directory to write one JSON file per episode to.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search once from the start state and print the root statistics.
    Plan {
        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args, Clone, Debug)]
struct GridArgs {
    /// Number of rows.
    #[arg(long, default_value = "5")]
    rows: u32,

    /// Number of columns.
    #[arg(long, default_value = "5")]
    cols: u32,

    /// Start cell as "row,col".
    #[arg(long, default_value = "0,0", value_parser = parse_cell)]
    start: Cell,

    /// Goal cell as "row,col".
    #[arg(long, default_value = "4,4", value_parser = parse_cell)]
    goal: Cell,

    /// Cell whose manual reveals the dynamics, as "row,col".
    #[arg(long, value_parser = parse_cell)]
    manual: Option<Cell>,

    /// Reward information gained about the dynamics. The reward bound used
    /// for rollout truncation then covers one observation's gain, but not
    /// the belief reset on leaving the manual cell.
    #[arg(long)]
    information_gain: bool,

    /// Probability that a move slips to one of the other three.
    #[arg(long, default_value = "0.2")]
    slip: f64,

    /// End episodes on reaching the goal.
    #[arg(long)]
    goal_terminal: bool,
}

impl GridArgs {
    fn world(&self) -> Result<GridWorld> {
        let config = GridConfig {
            rows: self.rows,
            cols: self.cols,
            start: self.start,
            goal: self.goal,
            manual: self.manual,
            information_gain: self.information_gain,
            slip: self.slip,
            goal_terminal: self.goal_terminal,
            ..GridConfig::default()
        };
        GridWorld::new(config).context("Invalid grid configuration")
    }
}

#[derive(Args, Clone, Debug)]
struct SearchArgs {
    /// Number of BAMCP iterations per decision.
    #[arg(short, long, default_value = "1500")]
    iterations: usize,

    /// Discount factor.
    #[arg(long, default_value = "0.95")]
    gamma: f64,

    /// Tolerance on the return lost by truncating rollouts.
    #[arg(long, default_value = "1.0")]
    epsilon: f64,

    /// UCB1 exploration constant (defaults to the largest reward).
    #[arg(long)]
    exploration: Option<f64>,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl SearchArgs {
    fn config(&self, world: &GridWorld) -> BamcpConfig {
        BamcpConfig::with_iterations(self.iterations)
            .with_discount(self.gamma)
            .with_tolerance(self.epsilon)
            .with_reward_bound(world.r_max())
    }

    fn exploration(&self, world: &GridWorld) -> f64 {
        self.exploration.unwrap_or_else(|| world.r_max())
    }
}

fn parse_cell(s: &str) -> Result<Cell> {
    let Some((row, col)) = s.split_once(',') else {
        bail!("expected \"row,col\", got {:?}", s);
    };
    let row = row.trim().parse().with_context(|| format!("bad row in {:?}", s))?;
    let col = col.trim().parse().with_context(|| format!("bad column in {:?}", s))?;
    Ok(Cell::new(row, col))
}

fn save_episode(output: &Path, index: usize, record: &EpisodeRecord) -> Result<()> {
    let filename = output.join(format!("episode_{:04}.json", index));
    let file =
        File::create(&filename).with_context(|| format!("Failed to create file: {:?}", filename))?;
    serde_json::to_writer_pretty(BufWriter::new(file), record)
        .with_context(|| format!("Failed to serialize episode {}", index))
}

/// Run the run command.
fn cmd_run(
    grid: &GridArgs,
    search: &SearchArgs,
    episodes: usize,
    steps: usize,
    output: Option<&Path>,
) -> Result<()> {
    let world = grid.world()?;
    let config = search.config(&world);
    let exploration = search.exploration(&world);

    if let Some(output) = output {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory: {:?}", output))?;
    }

    println!(
        "Playing {} episodes on a {}x{} grid, {} iterations/step",
        episodes, grid.rows, grid.cols, search.iterations
    );

    let start = Instant::now();
    let mut goals = 0;
    let mut returns = Vec::with_capacity(episodes);

    for i in 0..episodes {
        let seed = search.seed.wrapping_add(i as u64 * 1000);
        let record = run_episode(&world, &config, exploration, steps, seed)
            .with_context(|| format!("Episode {} failed", i))?;

        info!(
            episode = i,
            steps = record.steps.len(),
            total_reward = record.total_reward,
            reached_goal = record.reached_goal,
            "episode finished"
        );
        if record.reached_goal {
            goals += 1;
        }
        returns.push(record.discounted_return);

        if let Some(output) = output {
            save_episode(output, i, &record)?;
        }
    }

    let mean_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f64>() / returns.len() as f64
    };

    println!("\nCompleted in {:.2}s", start.elapsed().as_secs_f64());
    println!("Goal reached: {}/{}", goals, episodes);
    println!("Mean discounted return: {:.2}", mean_return);
    if let Some(output) = output {
        println!("Episodes saved to: {:?}", output);
    }
    Ok(())
}

/// Run the plan command.
fn cmd_plan(grid: &GridArgs, search: &SearchArgs) -> Result<()> {
    let world = grid.world()?;
    let config = search.config(&world);
    let mut bamcp: Bamcp<GridWorld, ChaCha8Rng> =
        Bamcp::new(config, ChaCha8Rng::seed_from_u64(search.seed))
            .context("Invalid search configuration")?
            .with_tree_policy(Ucb1::new(search.exploration(&world)));

    println!("Rollout horizon: {} steps", bamcp.horizon().steps());
    let result = bamcp.plan(&world, world.initial_state())?;

    println!("{:<8} {:>8} {:>10}", "move", "visits", "q");
    for stats in &result.root_stats {
        println!("{:<8} {:>8} {:>10.3}", stats.action.to_string(), stats.visits, stats.q);
    }
    println!("------------------------------");
    println!("Best move: {}", result.best_action);
    println!("Tree: {} nodes, depth {}", result.tree_size, result.max_depth);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            grid,
            search,
            episodes,
            steps,
            output,
        } => cmd_run(&grid, &search, episodes, steps, output.as_deref()),

        Commands::Plan { grid, search } => cmd_plan(&grid, &search),
    }
}
