use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use phoenix_core::{
    get_generator,
    record::{BufferedRecorder, Record},
    TrajectoryGenerator, TrajectoryGeneratorConfig,
};
use phoenix_policy_no_backend::MlpPolicy;
use phoenix_py_gym_env::{GymEnv, GymEnvConfig};
use serde::Serialize;
use std::{fs::File, path::PathBuf};

type Generator = TrajectoryGenerator<GymEnv, MlpPolicy>;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the gym environment
    #[arg(long, default_value = "DroneHoverBulletEnv-v0")]
    env: String,

    /// Python module registering the environment, can be repeated
    #[arg(long, default_value = "phoenix_drone_simulation")]
    module: Vec<String>,

    /// YAML file of the generator configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Policy file in the policy directory, overrides the configuration
    #[arg(long)]
    policy_file: Option<String>,

    /// Random seed of the environment
    #[arg(long, default_value_t = 0)]
    seed: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate the policy over a number of episodes
    Evaluate {
        /// Number of episodes
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// CSV file of per-episode statistics
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Render the policy, episode after episode
    Play {
        /// Keep exploration noise of the policy
        #[arg(long, default_value_t = false)]
        noise: bool,

        /// Stop after this number of episodes
        #[arg(long)]
        episodes: Option<usize>,
    },

    /// Collect a batch of transitions and write X and Y as CSV files
    Batch {
        /// Number of transitions
        #[arg(long, default_value_t = 1000)]
        n: usize,

        /// Output file of standardized observations
        #[arg(long, default_value = "x.csv")]
        out_x: PathBuf,

        /// Output file of raw next observations
        #[arg(long, default_value = "y.csv")]
        out_y: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct EpisodeRecord {
    episode: usize,
    ret: f64,
    length: usize,
    cost: f64,
}

impl EpisodeRecord {
    fn try_from_record(episode: usize, record: &Record) -> Result<Self> {
        Ok(Self {
            episode,
            ret: record.get_scalar("Episode return")?,
            length: record.get_scalar("Episode length")? as _,
            cost: record.get_scalar("Episode cost")?,
        })
    }
}

fn generator(args: &Args) -> Result<Generator> {
    let mut config = match args.config.as_ref() {
        Some(path) => TrajectoryGeneratorConfig::load(path)?,
        None => TrajectoryGeneratorConfig::default(),
    }
    .seed(args.seed);
    if let Some(policy_file) = args.policy_file.as_ref() {
        config = config.policy_file(policy_file.as_str());
    }

    // Bullet environments open their GUI on render("human"), so no render mode is set.
    let mut env_config = GymEnvConfig::default().name(args.env.as_str());
    for module in args.module.iter() {
        env_config = env_config.module(module.as_str());
    }
    get_generator(&env_config, config)
}

fn evaluate(args: &Args, episodes: usize, csv_path: Option<&PathBuf>) -> Result<()> {
    let mut generator = generator(args)?;
    let mut recorder = BufferedRecorder::new();
    let mean_return = generator.evaluate_with_recorder(episodes, &mut recorder)?;
    info!("Mean return over {} episodes: {}", episodes, mean_return);

    for (k, v) in recorder.aggregate().iter() {
        info!("{}: {:?}", k, v);
    }

    if let Some(path) = csv_path {
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for (i, record) in recorder.iter().enumerate() {
            wtr.serialize(EpisodeRecord::try_from_record(i, record)?)?;
        }
        wtr.flush()?;
    }
    Ok(())
}

fn write_rows(path: &PathBuf, rows: ndarray::Array2<f64>) -> Result<()> {
    // Vec<_> does not support writing a header in csv crate, so disable it.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(path)?);
    for row in rows.outer_iter() {
        wtr.serialize(row.to_vec())?;
    }
    wtr.flush()?;
    Ok(())
}

fn batch(args: &Args, n: usize, out_x: &PathBuf, out_y: &PathBuf) -> Result<()> {
    let mut generator = generator(args)?;
    let (x, y) = generator.get_batch(n)?.into_arrays()?;
    info!("Collected {} transitions", x.nrows());
    write_rows(out_x, x)?;
    write_rows(out_y, y)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match &args.command {
        Command::Evaluate { episodes, csv } => evaluate(&args, *episodes, csv.as_ref()),
        Command::Play { noise, episodes } => {
            let mut generator = generator(&args)?;
            generator.play_episodes(*noise, *episodes)
        }
        Command::Batch { n, out_x, out_y } => batch(&args, *n, out_x, out_y),
    }
}
