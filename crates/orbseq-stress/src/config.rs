use std::collections::HashSet;

use anyhow::{bail, ensure};
use clap::Parser;
use orbseq::{DEFAULT_BLOCK_SIZE, MAX_UPPER_BOUND, SequenceConfig};

/// Runtime configuration for the `orbseq-stress` binary.
///
/// Every flag falls back to an environment variable, and a `.env` file in the
/// working directory is loaded before parsing.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "orbseq-stress",
    version,
    about = "Hammer named orbseq sequences from many threads and verify uniqueness"
)]
pub struct CliArgs {
    /// Comma-separated sequence names. Threads are assigned round-robin.
    ///
    /// Environment variable: `SEQUENCES`
    #[arg(
        long,
        env = "SEQUENCES",
        value_delimiter = ',',
        default_value = "default"
    )]
    pub sequences: Vec<String>,

    /// Number of worker threads.
    ///
    /// Environment variable: `THREADS`
    #[arg(long, env = "THREADS", default_value_t = 4)]
    pub threads: usize,

    /// Ids requested by each worker.
    ///
    /// Environment variable: `IDS_PER_THREAD`
    #[arg(long, env = "IDS_PER_THREAD", default_value_t = 100_000)]
    pub ids_per_thread: usize,

    /// Values reserved per counter store round-trip.
    ///
    /// Environment variable: `BLOCK_SIZE`
    #[arg(long, env = "BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u64,

    /// Scramble ids over `[0, UPPER_BOUND)`. Raw ids are issued when unset.
    ///
    /// Environment variable: `UPPER_BOUND`
    #[arg(long, env = "UPPER_BOUND")]
    pub upper_bound: Option<u64>,

    /// First permutation seed.
    ///
    /// Environment variable: `SEED1`
    #[arg(long, env = "SEED1", default_value_t = orbseq::DEFAULT_SEED1)]
    pub seed1: u64,

    /// Second permutation seed.
    ///
    /// Environment variable: `SEED2`
    #[arg(long, env = "SEED2", default_value_t = orbseq::DEFAULT_SEED2)]
    pub seed2: u64,

    /// How many ids of each sequence to log once the run finishes.
    ///
    /// Environment variable: `SAMPLE`
    #[arg(long, env = "SAMPLE", default_value_t = 8)]
    pub sample: usize,
}

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub sequences: Vec<String>,
    pub threads: usize,
    pub ids_per_thread: usize,
    pub upper_bound: Option<u64>,
    pub sample: usize,
    pub sequence: SequenceConfig,
}

impl StressConfig {
    /// The sequence worker `worker` draws from.
    pub fn sequence_for(&self, worker: usize) -> &str {
        &self.sequences[worker % self.sequences.len()]
    }

    /// Workers sharing sequence `index`.
    pub fn workers_on(&self, index: usize) -> usize {
        (0..self.threads)
            .filter(|worker| worker % self.sequences.len() == index)
            .count()
    }
}

impl StressConfig {
    /// Parses a whitespace-separated flag line, for tests.
    #[cfg(test)]
    pub(crate) fn from_args(line: &str) -> anyhow::Result<Self> {
        let flags = line.split_whitespace();
        let argv = std::iter::once("orbseq-stress").chain(flags);
        Self::try_from(CliArgs::try_parse_from(argv)?)
    }
}

impl TryFrom<CliArgs> for StressConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        let sequences: Vec<String> = args
            .sequences
            .into_iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect();

        if sequences.is_empty() {
            bail!("SEQUENCES must name at least one sequence");
        }
        if args.threads == 0 {
            bail!("THREADS must be greater than 0");
        }
        if args.ids_per_thread == 0 {
            bail!("IDS_PER_THREAD must be greater than 0");
        }

        let sequence = SequenceConfig::default()
            .with_block_size(args.block_size)
            .with_seeds(args.seed1, args.seed2);
        sequence.validate()?;

        let config = Self {
            sequences,
            threads: args.threads,
            ids_per_thread: args.ids_per_thread,
            upper_bound: args.upper_bound,
            sample: args.sample,
            sequence,
        };

        if let Some(upper_bound) = config.upper_bound {
            ensure!(
                (1..=MAX_UPPER_BOUND).contains(&upper_bound),
                "UPPER_BOUND ({upper_bound}) must be in 1..={MAX_UPPER_BOUND}"
            );

            // The busiest sequence must fit all of its workers inside the bound.
            let busiest = (0..config.sequences.len())
                .map(|index| config.workers_on(index))
                .max()
                .unwrap_or(0);
            let demand = (busiest as u128) * (config.ids_per_thread as u128);
            ensure!(
                demand <= u128::from(upper_bound),
                "UPPER_BOUND ({upper_bound}) is below the {demand} ids one sequence must issue"
            );
        }

        Ok(config)
    }
}
