use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::Context;
use chunk_stream::{
    delay::DelayPolicy,
    diagnostics::{Diagnostics, TracingDiagnostics},
    io::{ChunkReadExt, copy_chunks},
    size::SizePolicy,
    utils::rate_counting_reader::RateCountingReader,
};
use clap::Parser;
use rand::{SeedableRng, rngs::SmallRng};
use thiserror::Error as ThisError;
use tracing::{Level, debug};

/// Re-emit a byte stream in delayed, bounded-size chunks.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Config {
    /// Send per-chunk debugging output to stderr
    #[arg(short = 'd', long)]
    debug: bool,

    /// Maximum chunk size to send, in bytes
    #[arg(short = 's', long, value_name = "bytes", default_value_t = 16)]
    max_size: usize,

    /// Non-zero value below --max-size to send random chunk sizes in [low, max]
    #[arg(short = 'l', long, value_name = "bytes", default_value_t = 0)]
    low_size: usize,

    /// Wait between chunks, in milliseconds
    #[arg(short = 'w', long, value_name = "ms", default_value_t = 100)]
    max_wait: u64,

    /// Non-zero value below --max-wait to wait random periods in [min, max]
    #[arg(short = 'm', long, value_name = "ms", default_value_t = 0)]
    min_wait: u64,

    /// Source file; reads stdin when omitted
    #[arg(short = 'i', long, value_name = "path")]
    input: Option<PathBuf>,

    /// Destination file, created or appended to; writes stdout when omitted
    #[arg(short = 'o', long, value_name = "path")]
    output: Option<PathBuf>,

    /// Optional seed used for deterministic randomization
    #[arg(long)]
    random_seed: Option<u64>,
}

#[derive(Debug, ThisError, PartialEq, Eq)]
enum ConfigError {
    #[error("--max-size must be greater than 0")]
    ZeroMaxSize,
    #[error("--low-size must not exceed --max-size ({low} > {max})")]
    LowSizeAboveMax { low: usize, max: usize },
    #[error("--min-wait must not exceed --max-wait ({min} > {max})")]
    MinWaitAboveMax { min: u64, max: u64 },
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::ZeroMaxSize);
        }

        if self.low_size > self.max_size {
            return Err(ConfigError::LowSizeAboveMax {
                low: self.low_size,
                max: self.max_size,
            });
        }

        if self.min_wait > self.max_wait {
            return Err(ConfigError::MinWaitAboveMax {
                min: self.min_wait,
                max: self.max_wait,
            });
        }

        Ok(())
    }

    /// Builds both policies from one base RNG so a single seed reproduces a run.
    fn policies(&self, seed: u64) -> anyhow::Result<(SizePolicy, DelayPolicy)> {
        let mut base_rng = SmallRng::seed_from_u64(seed);

        let size = SizePolicy::from_bounds(self.low_size, self.max_size, &mut base_rng)
            .context("invalid chunk size range")?;
        let delay = DelayPolicy::from_millis_bounds(self.min_wait, self.max_wait, &mut base_rng)
            .context("invalid wait range")?;

        Ok((size, delay))
    }

    fn open_input(&self) -> anyhow::Result<Box<dyn Read>> {
        match &self.input {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open input {}", path.display()))?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdin().lock())),
        }
    }

    fn open_output(&self) -> anyhow::Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open output {}", path.display()))?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdout().lock())),
        }
    }
}

/// Streams `input` into `output` under the configured policies.
///
/// Returns the number of bytes copied.
fn pump<R, W, O>(
    config: &Config,
    seed: u64,
    input: R,
    output: &mut W,
    diagnostics: O,
) -> anyhow::Result<u64>
where
    R: Read,
    W: Write + ?Sized,
    O: Diagnostics,
{
    let (size, delay) = config.policies(seed)?;
    debug!(?size, ?delay, "chunking");

    let mut buf = vec![0u8; size.max()];
    let mut reader = RateCountingReader::new(input.throttle_reads_with(size, delay, diagnostics));

    let copied = copy_chunks(&mut reader, output, &mut buf).context("copy failed")?;

    debug!(
        bytes = copied,
        rate_bps = reader.rate_bps().unwrap_or_default(),
        "done"
    );
    Ok(copied)
}

/// Without `--debug` only warnings and errors reach stderr.
fn log_level(debug: bool) -> Level {
    if debug { Level::DEBUG } else { Level::WARN }
}

fn init_tracing(debug: bool) {
    // stdout carries the data
    tracing_subscriber::fmt()
        .with_max_level(log_level(debug))
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let mut cfg = Config::parse();
    init_tracing(cfg.debug);
    cfg.validate()?;

    if cfg.random_seed.is_none() {
        let seed = rand::random::<u64>();
        cfg.random_seed = Some(seed);
    }
    let seed = cfg.random_seed.unwrap_or_default();
    debug!("random seed: {seed}");

    let input = cfg.open_input()?;
    let mut output = cfg.open_output()?;

    if cfg.debug {
        pump(&cfg, seed, input, &mut output, TracingDiagnostics)?;
    } else {
        pump(&cfg, seed, input, &mut output, io::sink())?;
    }

    Ok(())
}
