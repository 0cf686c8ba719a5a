//! CLI administration tool for slug-redirector.
//!
//! Manages API tokens and redirections directly against the database, without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Issue a token for the admin API
//! cargo run --bin admin -- token create --name ci
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke ci
//!
//! # Inspect and manage redirections
//! cargo run --bin admin -- redirect list --sort clicks
//! cargo run --bin admin -- redirect reset-clicks launch-day
//! cargo run --bin admin -- redirect delete launch-day
//!
//! # Totals and database checks
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) and `TOKEN_SIGNING_SECRET`,
//! which must match the server's value for issued tokens to be accepted.

use slug_redirector::application::services::{
    ClickService, RedirectAdminService, WriterDefaults, generate_token, hash_token,
};
use slug_redirector::config::{Config, load_from_env};
use slug_redirector::domain::entities::{ListFilter, ListSort};
use slug_redirector::domain::repositories::TokenRepository;
use slug_redirector::infrastructure::persistence::{
    PgRedirectRepository, PgTokenRepository, connect_with_retry,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing slug-redirector.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage redirections
    Redirect {
        #[command(subcommand)]
        action: RedirectAction,
    },

    /// Show totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "ci", "editor laptop")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Clicks,
}

impl From<SortArg> for ListSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => ListSort::Newest,
            SortArg::Clicks => ListSort::Clicks,
        }
    }
}

#[derive(Subcommand)]
enum RedirectAction {
    /// List redirections
    List {
        /// Substring filter over slug, title, description, keywords and content type
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,

        #[arg(short, long, default_value_t = 50)]
        limit: u64,
    },

    /// Delete a redirection permanently
    Delete {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Reset the click counter of a redirection to zero
    ResetClicks {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

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

    let config = load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL or DB_USER/DB_PASSWORD/DB_NAME must be set")?;

    let pool = connect_with_retry(&config, &database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &config, &pool).await?,
        Commands::Redirect { action } => handle_redirect_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    match action {
        TokenAction::Create { name, yes } => {
            create_token(&repo, &config.token_signing_secret, name, yes).await
        }
        TokenAction::List => list_tokens(&repo).await,
        TokenAction::Revoke { name_or_id } => revoke_token(&repo, name_or_id).await,
    }
}

/// Creates a new API token.
///
/// Only the HMAC of the token is stored; the raw value is printed once.
async fn create_token(
    repo: &PgTokenRepository,
    secret: &str,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("admin")
            .interact_text()?,
    };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create token '{token_name}'?"))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_value = generate_token();
    let token_hash = hash_token(secret, &token_value);

    let token = repo
        .create_token(&token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "Token created".green().bold());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!("  Name:  {}", token.name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "Save this token now; it cannot be shown again.".red().bold()
    );
    println!();
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/redirections",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<30} {:<18} {}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<4} {:<30} {:<18} {}",
            token.id,
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string(),
            status
        );
    }

    Ok(())
}

/// Revokes a token by ID (numeric input) or name.
async fn revoke_token(repo: &PgTokenRepository, name_or_id: String) -> Result<()> {
    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    let confirmed = Confirm::new()
        .with_prompt(format!("Revoke token '{}' (id {})?", token.name, token.id))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!("{}", "Token revoked".green().bold());
    Ok(())
}

async fn handle_redirect_action(
    action: RedirectAction,
    config: &Config,
    pool: &PgPool,
) -> Result<()> {
    let repo = Arc::new(PgRedirectRepository::new(Arc::new(pool.clone())));
    let admin = RedirectAdminService::new(
        Arc::clone(&repo),
        WriterDefaults {
            author: config.default_author.clone(),
            site_name: config.default_site_name.clone(),
        },
    );

    match action {
        RedirectAction::List { query, sort, limit } => {
            let page = admin
                .list(ListFilter {
                    query,
                    sort: sort.into(),
                    offset: 0,
                    limit,
                })
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list redirections: {}", e))?;

            if page.items.is_empty() {
                println!("{}", "  No redirections found".yellow());
                return Ok(());
            }

            println!(
                "  {:<32} {:>8}  {}",
                "Slug".bright_white().bold(),
                "Clicks".bright_white().bold(),
                "URL".bright_white().bold()
            );
            for record in &page.items {
                println!(
                    "  {:<32} {:>8}  {}",
                    record.slug.cyan(),
                    record.clicks.to_string().bright_green(),
                    record.url.bright_black()
                );
            }
            println!();
            println!(
                "  Showing {} of {}",
                page.items.len(),
                page.total.to_string().bright_white().bold()
            );
        }
        RedirectAction::Delete { slug, yes } => {
            if !yes && !confirm(&format!("Delete '{slug}' permanently?"))? {
                println!("{}", "Cancelled".red());
                return Ok(());
            }

            admin
                .delete(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete '{}': {}", slug, e))?;
            println!("{}", format!("Deleted '{slug}'").green().bold());
        }
        RedirectAction::ResetClicks { slug, yes } => {
            if !yes && !confirm(&format!("Reset click counter of '{slug}'?"))? {
                println!("{}", "Cancelled".red());
                return Ok(());
            }

            ClickService::new(repo)
                .reset(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to reset '{}': {}", slug, e))?;
            println!("{}", format!("Click counter of '{slug}' reset").green().bold());
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Displays totals across all redirections.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let (redirections, clicks): (i64, Option<i64>) =
        sqlx::query_as("SELECT COUNT(*), SUM(clicks)::BIGINT FROM redirections")
            .fetch_one(pool)
            .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Redirections:  {}",
        redirections.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:        {}",
        clicks.unwrap_or(0).to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            sqlx::query("SELECT 1").fetch_one(pool).await?;
            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Applied migrations: {}", migrations.to_string().bright_white());
        }
    }

    Ok(())
}
