//! CLI administration tool for shorty.
//!
//! Works directly against PostgreSQL through the same service the HTTP
//! server uses, so every creation rule applies here too.
//!
//! # Usage
//!
//! ```bash
//! # List every short URL
//! cargo run --bin admin -- list
//!
//! # Create a short URL (prompts for the url when omitted)
//! cargo run --bin admin -- create https://example.com --code example
//!
//! # Show statistics for one code
//! cargo run --bin admin -- stats example
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components: PostgreSQL connection

use shorty::application::mapper::ShortUrlDto;
use shorty::application::services::ShortUrlService;
use shorty::config::{Config, DatabaseConfig, mask_connection_string};
use shorty::domain::code_policy::CodeGenerator;
use shorty::domain::entities::NewShortUrl;
use shorty::infrastructure::persistence::PgShortUrlRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shorty.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// List all short URLs
    List,

    /// Create a short URL
    Create {
        /// Destination url
        url: Option<String>,

        /// Suggested short code (generated when omitted)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Show statistics for a short code
    Stats {
        /// Short code (case-sensitive)
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

type PgService = ShortUrlService<PgShortUrlRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;

    let database = match config.database.clone() {
        Some(database) => database,
        None => {
            println!(
                "{}",
                "STORAGE=memory has nothing to administer; using PostgreSQL".yellow()
            );
            let database = DatabaseConfig::from_env()?;
            database.validate()?;
            database
        }
    };
    let pool = shorty::server::connect_database(&database).await?;

    let service = ShortUrlService::new(
        Arc::new(PgShortUrlRepository::new(Arc::new(pool.clone()))),
        CodeGenerator::new(config.code_length),
    )
    .with_generation_attempts(config.code_generation_attempts);

    match cli.command {
        Commands::List => list_short_urls(&service).await?,
        Commands::Create { url, code } => create_short_url(&service, url, code).await?,
        Commands::Stats { code } => show_stats(&service, &code).await?,
        Commands::Db { action } => match action {
            DbAction::Check => check_database(&pool, &database.url).await?,
        },
    }

    Ok(())
}

/// Prints every stored short URL as a table.
async fn list_short_urls(service: &PgService) -> Result<()> {
    let mut records = service.list_all().await?;

    if records.is_empty() {
        println!("{}", "No short URLs yet".yellow());
        return Ok(());
    }

    records.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    println!("{}", "Short URLs".bright_blue().bold());
    println!();
    println!(
        "{:<16} {:>10}  {:<20}  {}",
        "CODE".bold(),
        "REDIRECTS".bold(),
        "LAST SEEN".bold(),
        "URL".bold()
    );

    for record in &records {
        println!(
            "{:<16} {:>10}  {:<20}  {}",
            record.short_code.cyan(),
            record.redirect_count,
            format_last_seen(record),
            record.url
        );
    }

    println!();
    println!("{} {}", "Total:".bold(), records.len());

    Ok(())
}

/// Creates a short URL, prompting for the destination if needed.
async fn create_short_url(
    service: &PgService,
    url: Option<String>,
    code: Option<String>,
) -> Result<()> {
    let url = match url {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Destination url")
            .interact_text()?,
    };

    let created = service
        .create(NewShortUrl {
            url: Some(url),
            short_code: code,
        })
        .await?;

    println!("{}", "Short URL created".green().bold());
    println!("  {} {}", "Code:".bold(), created.short_code.cyan());
    println!("  {} {}", "Url:".bold(), created.url);
    println!("  {} /{}/stats", "Stats:".bold(), created.short_code);

    Ok(())
}

/// Prints the statistics of one short code.
async fn show_stats(service: &PgService, code: &str) -> Result<()> {
    let Some(record) = service.get_by_code(code).await? else {
        println!(
            "{}",
            format!("The code {} cannot be found in the system", code).red()
        );
        return Ok(());
    };

    println!("{}", format!("Statistics for {}", code).bright_blue().bold());
    println!();
    println!("  {} {}", "Url:".bold(), record.url);
    println!(
        "  {} {}",
        "Created:".bold(),
        record.start_date.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {} {}", "Last seen:".bold(), format_last_seen(&record));
    println!("  {} {}", "Redirects:".bold(), record.redirect_count);

    Ok(())
}

/// Verifies that the database answers queries.
async fn check_database(pool: &PgPool, database_url: &str) -> Result<()> {
    println!("{}", "Checking database connection...".bright_blue());

    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(pool)
        .await
        .context("Database query failed")?;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
        .fetch_one(pool)
        .await
        .context("Failed to count short URLs")?;

    println!("{}", "Database connection OK".green().bold());
    println!("  {} {}", "Database:".bold(), mask_connection_string(database_url));
    println!("  {} {}", "Server:".bold(), version);
    println!("  {} {}", "Short URLs:".bold(), count);

    Ok(())
}

fn format_last_seen(record: &ShortUrlDto) -> String {
    record
        .last_seen_date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}
