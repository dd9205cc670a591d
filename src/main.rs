use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use release_channel::config::{AppConfig, ComponentConfig, data_dir, db_path, log_path};
use release_channel::logging;
use release_channel::release::cache::{CacheStore, DecisionCache, MemoryStore, cache_key};
use release_channel::release::channel::ChannelLevel;
use release_channel::release::checker::{CheckRequest, UpdateChecker};
use release_channel::release::sources::GitHubSource;
use release_channel::release::sources::github::DEFAULT_BASE_URL;
use release_channel::release::store::SqliteStore;

#[derive(Parser)]
#[command(name = "release-channel")]
#[command(version, about = "Channel-aware update checks against a repository release feed")]
struct Cli {
    /// Write log records as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check one component, or every component listed in a config file
    Check(CheckArgs),
    /// Inspect or clear the decision cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// JSON config file listing components
    #[arg(long, conflicts_with = "repository")]
    config: Option<PathBuf>,

    /// Repository identifier, e.g. owner/name
    #[arg(long)]
    repository: Option<String>,

    /// Cache identity of the component (defaults to the repository name)
    #[arg(long)]
    slug: Option<String>,

    /// Installed version
    #[arg(long, conflicts_with = "version_file")]
    installed: Option<String>,

    /// File carrying a `Version:` header
    #[arg(long)]
    version_file: Option<PathBuf>,

    /// Minimum release channel: dev, alpha, beta or production
    #[arg(long, default_value = "production")]
    channel: ChannelLevel,

    /// Base URL of the GitHub API
    #[arg(long)]
    api_base_url: Option<String>,

    /// Resolve from upstream even if a fresh decision is cached
    #[arg(long)]
    force: bool,

    /// Keep decisions in memory only
    #[arg(long)]
    no_cache: bool,

    /// Print the readme at the selected release's tag
    #[arg(long)]
    readme: bool,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the cache database path
    Path,
    /// List cached keys
    List,
    /// Delete expired entries
    Prune,
    /// Delete all entries
    Clear,
    /// Delete the entry for one component so the next check goes upstream
    Invalidate {
        slug: String,

        #[arg(long, default_value = "production")]
        channel: ChannelLevel,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    std::fs::create_dir_all(data_dir())
        .with_context(|| format!("Failed to create data directory {:?}", data_dir()))?;
    let _guard = logging::init(&log_path(), cli.json_logs);

    match cli.command {
        Command::Check(args) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_check(args)),
        Command::Cache { action } => run_cache(action),
    }
}

fn run_cache(action: CacheAction) -> anyhow::Result<()> {
    let path = db_path();
    let open = || SqliteStore::new(&path);

    match action {
        CacheAction::Path => println!("{}", path.display()),
        CacheAction::List => {
            for key in open()?.keys()? {
                println!("{}", key);
            }
        }
        CacheAction::Prune => println!("Removed {} expired entries", open()?.purge_expired()?),
        CacheAction::Clear => println!("Removed {} entries", open()?.clear()?),
        CacheAction::Invalidate { slug, channel } => {
            let key = cache_key(&slug, channel);
            DecisionCache::new(open()?).invalidate(&key)?;
            println!("Invalidated {}", key);
        }
    }
    Ok(())
}

async fn run_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig {
            components: vec![component_from_args(&args)?],
            ..AppConfig::default()
        },
    };

    let mut requests = Vec::new();
    for component in &config.components {
        match component.to_request()? {
            Some(request) => requests.push(request),
            None => warn!("Skipping {}: installed version unknown", component.slug),
        }
    }

    let base_url = args
        .api_base_url
        .clone()
        .or_else(|| config.api_base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let mut github = GitHubSource::new(&base_url);
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        github = github.with_token(token);
    }
    let github = Arc::new(github);

    if args.no_cache || !config.cache.enabled {
        let checker = UpdateChecker::new(github.clone(), DecisionCache::new(MemoryStore::new()));
        report(&checker, &github, &requests, &args).await
    } else {
        let store = SqliteStore::new(&db_path())?;
        let checker = UpdateChecker::new(github.clone(), DecisionCache::new(store));
        report(&checker, &github, &requests, &args).await
    }
}

fn component_from_args(args: &CheckArgs) -> anyhow::Result<ComponentConfig> {
    let Some(repository) = args.repository.clone() else {
        bail!("either --config or --repository is required");
    };
    if args.installed.is_none() && args.version_file.is_none() {
        bail!("either --installed or --version-file is required");
    }

    let slug = args.slug.clone().unwrap_or_else(|| {
        repository
            .rsplit('/')
            .next()
            .unwrap_or(&repository)
            .to_string()
    });

    Ok(ComponentConfig {
        slug,
        repository,
        channel: args.channel,
        installed_version: args.installed.clone(),
        version_file: args.version_file.clone(),
    })
}

async fn report<S: CacheStore>(
    checker: &UpdateChecker<S>,
    github: &GitHubSource,
    requests: &[CheckRequest],
    args: &CheckArgs,
) -> anyhow::Result<()> {
    let decisions = if args.force {
        let mut decisions = Vec::with_capacity(requests.len());
        for request in requests {
            decisions.push(checker.refresh(request).await);
        }
        decisions
    } else {
        checker.check_all(requests).await
    };

    for (request, decision) in requests.iter().zip(decisions) {
        let Some(decision) = decision else {
            println!(
                "{}",
                json!({ "slug": request.slug, "error": "upstream unavailable" })
            );
            continue;
        };

        info!(
            "{}: update_available={} target={:?}",
            request.slug, decision.update_available, decision.target_version
        );
        println!("{}", json!({ "slug": request.slug, "decision": decision }));

        if args.readme
            && let Some(release) = &decision.selected_release
        {
            match github
                .fetch_companion_file(&request.repository, &release.tag_reference, "README.md")
                .await
            {
                Ok(readme) => println!("{}", readme),
                Err(e) => warn!("Failed to fetch readme for {}: {}", request.slug, e),
            }
        }
    }

    Ok(())
}
