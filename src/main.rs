use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use proxy_sift::{
    probe::{external_probe_path, ProbeProtocol},
    safe_mode_from_env, storage, BatchValidator, TieredProber, ValidationOptions, SAFE_MODE_ENV,
};
use std::path::PathBuf;

/// A proxy descriptor reachability filter with tiered probing
#[derive(Parser)]
#[command(name = "proxy-sift")]
#[command(about = "A proxy descriptor reachability filter with tiered probing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Probing knobs shared by every subcommand
#[derive(Args)]
struct ProbeArgs {
    /// Per-probe timeout in seconds
    #[arg(long, default_value = "3.0")]
    timeout: f64,

    /// Fallback ports tried when the descriptor's own port fails or is missing
    #[arg(long, value_delimiter = ',', default_value = "443,80,53")]
    fallback_ports: Vec<u16>,

    /// Minimum randomized pause between evaluations, seconds
    #[arg(long, default_value = "0.5")]
    min_delay: f64,

    /// Maximum randomized pause between evaluations, seconds
    #[arg(long, default_value = "1.5")]
    max_delay: f64,

    /// Protocol for the external scanner probe (tcp, udp, icmp)
    #[arg(long, default_value = "tcp")]
    external_protocol: String,
}

impl ProbeArgs {
    fn to_options(&self) -> ValidationOptions {
        ValidationOptions::new()
            .with_timeout_seconds(self.timeout)
            .with_fallback_ports(self.fallback_ports.clone())
            .with_delay_bounds(self.min_delay, self.max_delay)
    }

    fn to_prober(&self) -> Result<TieredProber> {
        let protocol = ProbeProtocol::parse(&self.external_protocol).ok_or_else(|| {
            anyhow!(
                "Invalid external probe protocol: {}. Use: tcp, udp, icmp",
                self.external_protocol
            )
        })?;
        Ok(TieredProber::with_external_protocol(protocol))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check a descriptor file and keep only reachable entries
    Check {
        /// Input file, one descriptor per line
        input: PathBuf,
        /// Output file for surviving descriptors (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite the input file in place
        #[arg(long, conflicts_with = "output")]
        replace: bool,
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Fetch a remote subscription list and check it
    Fetch {
        /// Subscription URL (plain lines or a base64 blob)
        url: String,
        /// Output file for surviving descriptors (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Check a base64-encoded batch blob and emit the surviving blob
    Blob {
        /// File containing the base64 blob
        input: PathBuf,
        /// Output file for the resulting blob (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        probe: ProbeArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Per-item status lines go through the log facade at info; show them
    // unless the caller overrides RUST_LOG.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let safe_mode = safe_mode_from_env();
    if safe_mode {
        println!("Safe mode active ({}=1): probing disabled", SAFE_MODE_ENV);
    } else if external_probe_path().is_none() {
        println!("External scanner not found on PATH, using connect/echo probes only");
    }

    match cli.command {
        Commands::Check {
            input,
            output,
            replace,
            probe,
        } => {
            let options = probe.to_options().with_replace(replace);
            let lines = storage::read_descriptors(&input)?;
            println!("Loaded {} lines from {:?}", lines.len(), input);

            let validator = BatchValidator::new(options.clone())
                .with_prober(probe.to_prober()?)
                .with_safe_mode(safe_mode);
            let kept = validator.validate(&lines).await;
            print_summary(lines.len(), kept.len());

            if options.replace {
                storage::write_descriptors(&input, &kept)?;
                println!("Rewrote {:?} in place", input);
            } else {
                emit(output.as_deref(), &kept)?;
            }
        }
        Commands::Fetch { url, output, probe } => {
            let lines = storage::fetch_descriptors(&url).await?;
            println!("Fetched {} lines from {}", lines.len(), url);

            let validator = BatchValidator::new(probe.to_options())
                .with_prober(probe.to_prober()?)
                .with_safe_mode(safe_mode);
            let kept = validator.validate(&lines).await;
            print_summary(lines.len(), kept.len());

            emit(output.as_deref(), &kept)?;
        }
        Commands::Blob {
            input,
            output,
            probe,
        } => {
            let blob = std::fs::read_to_string(&input)?;

            let validator = BatchValidator::new(probe.to_options())
                .with_prober(probe.to_prober()?)
                .with_safe_mode(safe_mode);
            let result = validator.validate_blob(blob.trim()).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &result)?;
                    println!("Saved blob to {:?}", path);
                }
                None => println!("{}", result),
            }
        }
    }

    Ok(())
}

fn print_summary(total: usize, kept: usize) {
    println!("Results: {} kept, {} dropped or skipped", kept, total - kept);
}

fn emit(output: Option<&std::path::Path>, kept: &[String]) -> Result<()> {
    match output {
        Some(path) => {
            storage::write_descriptors(path, kept)?;
            println!("Saved {} descriptors to {:?}", kept.len(), path);
        }
        None => {
            for line in kept {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
