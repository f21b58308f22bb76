//! CLI administration tool for shortkey.
//!
//! Provides commands for inspecting and disabling links, converting between
//! ids and keys, viewing statistics, and checking the database without
//! requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Show a link with its click totals
//! cargo run --bin admin -- link show 000001
//!
//! # Create a link (same rules as POST /api/links, no rate limit)
//! cargo run --bin admin -- link create https://example.com --alias promo
//!
//! # Disable a link
//! cargo run --bin admin -- link disable promo
//!
//! # Convert between row ids and keys (no database needed)
//! cargo run --bin admin -- key encode 12345
//! cargo run --bin admin -- key decode 00003d7
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Database settings are read exactly as by the server (`DATABASE_URL` or
//! `DB_*`). The in-memory backend has nothing to administer.

use shortkey::application::services::{KeyAllocator, LinkService, ShortenCommand, StatsService};
use shortkey::config::{Config, StorageBackend};
use shortkey::domain::entities::Link;
use shortkey::domain::repositories::LinkRepository;
use shortkey::error::AppError;
use shortkey::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use shortkey::server::connect_pool;
use shortkey::utils::key_codec;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortkey.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Convert between row ids and keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Show a link and its click totals
    Show {
        key: String,
    },

    /// Create a link
    Create {
        url: String,

        /// Custom key
        #[arg(short, long)]
        alias: Option<String>,

        /// Expire the link after this many days
        #[arg(short, long)]
        expires_in_days: Option<i64>,
    },

    /// Disable a link so it answers 410 Gone
    Disable {
        key: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Key codec subcommands.
#[derive(Subcommand)]
enum KeyAction {
    /// Print the key for a row id
    Encode {
        id: u64,

        /// Left-pad to this length
        #[arg(short, long, default_value_t = 6)]
        min_len: usize,
    },

    /// Print the row id encoded in a system key
    Decode { key: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Key { action } => handle_key_action(action)?,
        Commands::Link { action } => {
            let (config, pool) = connect().await?;
            handle_link_action(action, &config, &pool).await?
        }
        Commands::Stats => {
            let (_, pool) = connect().await?;
            handle_stats(&pool).await?
        }
        Commands::Db { action } => {
            let (_, pool) = connect().await?;
            handle_db_action(action, &pool).await?
        }
    }

    Ok(())
}

/// Loads server configuration and connects to its database.
async fn connect() -> Result<(Config, PgPool)> {
    let config = Config::from_env()?;
    if config.storage_backend == StorageBackend::Memory {
        anyhow::bail!("The admin tool needs the postgres backend (STORAGE_BACKEND=postgres)");
    }
    let pool = connect_pool(&config).await?;
    Ok((config, pool))
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let allocator = KeyAllocator::new(links.clone(), config.key_min_len, config.key_max_len);
    let service = LinkService::new(
        links,
        allocator,
        config.base_url.clone(),
        config.storage_timeout(),
    );

    match action {
        LinkAction::Show { key } => {
            let stats = StatsService::new(Arc::new(PgClickRepository::new(pool)));
            show_link(&service, &stats, &key).await?
        }
        LinkAction::Create {
            url,
            alias,
            expires_in_days,
        } => create_link(&service, url, alias, expires_in_days).await?,
        LinkAction::Disable { key, yes } => disable_link(&service, &key, yes).await?,
    }

    Ok(())
}

fn print_link(service: &LinkService, link: &Link) {
    let state = if link.is_disabled {
        "DISABLED".red()
    } else if link.is_expired() {
        "EXPIRED".yellow()
    } else {
        "ACTIVE".green()
    };

    println!("  Key:       {}", link.key.cyan().bold());
    println!("  Short URL: {}", service.short_url(&link.key).bright_white());
    println!("  Long URL:  {}", link.long_url);
    println!(
        "  Kind:      {}",
        if link.is_custom { "custom" } else { "system" }
    );
    println!(
        "  Created:   {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    if let Some(expires_at) = link.expires_at {
        println!(
            "  Expires:   {}",
            expires_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }
    println!("  Status:    {}", state);
}

/// Prints a link with its click totals for the last 30 days.
async fn show_link(service: &LinkService, stats: &StatsService, key: &str) -> Result<()> {
    println!("{}", "🔗 Link".bright_blue().bold());
    println!();

    let link = service
        .find(key)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    print_link(service, &link);

    let stats = stats
        .link_stats(&link, None, None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

    println!();
    println!(
        "  Clicks:    {} total, {} since {}",
        stats.total_clicks.to_string().bright_green().bold(),
        stats
            .daily
            .iter()
            .map(|d| d.clicks)
            .sum::<i64>()
            .to_string()
            .bright_green(),
        stats.from
    );
    if let Some(last) = stats.last_clicked_at {
        println!(
            "  Last click: {}",
            last.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }
    println!();

    Ok(())
}

async fn create_link(
    service: &LinkService,
    url: String,
    alias: Option<String>,
    expires_in_days: Option<i64>,
) -> Result<()> {
    println!("{}", "✨ Create Link".bright_blue().bold());
    println!();

    let expires_at = match expires_in_days {
        Some(days) if days > 0 => Some(Utc::now() + Duration::days(days)),
        Some(days) => anyhow::bail!("--expires-in-days must be positive, got {days}"),
        None => None,
    };

    let allocation = service
        .shorten(ShortenCommand {
            url,
            alias,
            expires_at,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    if allocation.created {
        println!("{}", "✅ Link created".green().bold());
    } else {
        println!("{}", "ℹ️  URL already shortened, existing link:".yellow());
    }
    println!();
    print_link(service, &allocation.link);
    println!();

    Ok(())
}

/// Disables a link with confirmation prompt.
///
/// # Safety
///
/// - Requires confirmation (default: No) unless `--yes`
/// - Reports links that are already disabled
async fn disable_link(service: &LinkService, key: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔒 Disable Link".bright_blue().bold());
    println!();

    let link = service
        .find(key)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if link.is_disabled {
        println!("{}", "⚠️  This link is already disabled".yellow());
        return Ok(());
    }

    print_link(service, &link);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Disable this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .disable(key)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to disable link: {}", e))?;

    println!();
    println!("{}", "✅ Link disabled".green().bold());
    println!();

    Ok(())
}

fn handle_key_action(action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Encode { id, min_len } => {
            println!("{}", key_codec::pad(&key_codec::encode(id), min_len));
        }
        KeyAction::Decode { key } => {
            let id = key_codec::decode(&key).map_err(AppError::from)?;
            println!("{id}");
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links, split by kind
/// - Number of disabled links
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, custom, disabled): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE is_custom), \
                COUNT(*) FILTER (WHERE is_disabled) \
         FROM links WHERE short_key IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    let clicks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
        .fetch_one(pool)
        .await?;

    println!("  Links:    {}", links.to_string().bright_green().bold());
    println!("    custom: {}", custom.to_string().bright_white());
    println!("    system: {}", (links - custom).to_string().bright_white());
    println!("  Disabled: {}", disabled.to_string().bright_red());
    println!("  Clicks:   {}", clicks.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let next_id: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM links")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  Highest link id: {}",
                next_id.unwrap_or(0).to_string().bright_white()
            );
            println!();
        }
    }

    Ok(())
}
