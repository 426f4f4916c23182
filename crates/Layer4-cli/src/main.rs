//! depcache CLI - Main entry point

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use depcache_core::CacheError;
use depcache_foundation::{CacheConfig, PROJECT_DIR};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// depcache - compiler dependency cache inspector
#[derive(Parser, Debug)]
#[command(name = "depcache")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Cache root directory (overrides storeDir from config)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Replace cache size and SQLite tuning with a preset
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Profile {
    /// Small memory footprint, fully synchronous writes
    Minimal,
    /// Large in-memory caches, relaxed durability
    Performance,
}

impl Profile {
    /// Preset tuning; the configured store directory is kept
    fn apply(self, config: CacheConfig) -> CacheConfig {
        let preset = match self {
            Profile::Minimal => CacheConfig::minimal(),
            Profile::Performance => CacheConfig::performance(),
        };
        CacheConfig {
            store_dir: config.store_dir,
            ..preset
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all cached classes
    Classes,
    /// Show the record of one class
    Show {
        /// Qualified class name, e.g. com/example/Foo
        class: String,
    },
    /// Show which classes depend on a class, and through which members
    BackDeps {
        /// Qualified class name
        class: String,
    },
    /// Import parsed class documents (JSON) and index their references
    Import {
        /// Class documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a class and every index entry about it
    Remove {
        /// Qualified class name
        class: String,
    },
    /// Show record count and in-memory cache statistics
    Stats,
    /// Delete all cache files under the root
    Wipe,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let mut config = match CacheConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            CacheConfig::default()
        }
    };
    if let Some(profile) = args.profile {
        config = profile.apply(config);
    }

    let root = args
        .root
        .or_else(|| config.store_dir.clone())
        .unwrap_or_else(|| PathBuf::from(PROJECT_DIR).join("cache"));

    let result = run(args.command, root, &config);
    if let Err(e) = &result {
        if e
            .chain()
            .filter_map(|cause| cause.downcast_ref::<CacheError>())
            .any(CacheError::requires_rebuild)
        {
            eprintln!("The cache is unreadable; run `depcache wipe` and rebuild.");
        }
    }
    result
}

fn run(command: Command, root: PathBuf, config: &CacheConfig) -> anyhow::Result<()> {
    let mut session = commands::Session::open(root, config)?;
    let result = match command {
        Command::Classes => session.list_classes(),
        Command::Show { class } => session.show(&class),
        Command::BackDeps { class } => session.back_deps(&class),
        Command::Import { files } => session.import(&files),
        Command::Remove { class } => session.remove(&class),
        Command::Stats => session.stats(),
        Command::Wipe => return session.wipe(),
    };

    // Always release the stores, but report the command error first
    let closed = session.close();
    result?;
    closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_keeps_store_dir() {
        let config = CacheConfig::new().cache_size(5).store_dir("/tmp/depcache");

        let tuned = Profile::Performance.apply(config);

        assert_eq!(tuned.cache_size, CacheConfig::performance().cache_size);
        assert_eq!(tuned.synchronous, CacheConfig::performance().synchronous);
        assert_eq!(tuned.store_dir, Some(PathBuf::from("/tmp/depcache")));
    }

    #[test]
    fn test_parse_stats_with_profile() {
        let args = Args::try_parse_from(["depcache", "--profile", "minimal", "stats"])
            .expect("parse");
        assert!(matches!(args.command, Command::Stats));
        assert!(matches!(args.profile, Some(Profile::Minimal)));
    }
}
