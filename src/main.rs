use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use javadex::{RepositorySource, RepositorySyncManager, SyncRepositoriesUseCase};

#[derive(Parser)]
#[command(name = "javadex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the local clones
    #[arg(short, long, global = true, default_value = "./repositories")]
    base_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone or update the given repositories
    Sync {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Branch to track for every given URL (default: the remote's default branch)
        #[arg(short = 'B', long)]
        branch: Option<String>,

        /// Clone full history instead of a shallow depth-1 clone
        #[arg(long)]
        full_history: bool,

        /// Print outcomes as JSON instead of human-readable lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sync {
            urls,
            branch,
            full_history,
            json,
        } => {
            let mut manager = RepositorySyncManager::new(&cli.base_dir)?;
            if full_history {
                manager = manager.with_clone_depth(None);
            }
            let use_case = SyncRepositoriesUseCase::new(Arc::new(Mutex::new(manager)));

            let sources: Vec<RepositorySource> = urls
                .iter()
                .map(|url| {
                    let mut source = RepositorySource::new(url.as_str());
                    if let Some(ref branch) = branch {
                        source = source.with_branch(branch.as_str());
                    }
                    source
                })
                .collect();

            let outcomes = use_case.execute(&sources).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
                return Ok(());
            }

            let mut failed = 0usize;
            for outcome in &outcomes {
                if outcome.success {
                    let commit = outcome.record.commit_hash.as_deref().unwrap_or("unknown");
                    let short = &commit[..commit.len().min(12)];
                    println!("ok    {} [{}]", outcome.url(), short);
                    println!("      {}", outcome.message);
                } else {
                    failed += 1;
                    println!("fail  {}", outcome.url());
                    println!("      {}", outcome.message);
                    if let Some(ref detail) = outcome.error_detail {
                        println!("      {}", detail);
                    }
                }
            }
            println!(
                "\n{} synchronized, {} failed",
                outcomes.len() - failed,
                failed
            );
        }
    }

    Ok(())
}
