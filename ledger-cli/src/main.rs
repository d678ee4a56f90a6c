//! Ledger CLI
//!
//! Command-line interface for the personal income/expense ledger.

mod backend;
mod config;
mod output;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledger_client::BluelyticsRates;
use ledger_core::{EditField, EditSession, MutationCoordinator, RECENT_ROWS};
use ledger_types::{
    Category, Direction, LedgerError, Market, RateProvider, TransactionDraft, TransactionId,
    domain::fecha,
};

use crate::backend::Backend;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "ledger")]
#[command(author, version, about = "Personal income and expense ledger", long_about = None)]
struct Cli {
    /// Owner whose rows are shown and written
    #[arg(long, env = "LEDGER_OWNER_ID")]
    owner: Option<String>,

    /// Local store: `memory://` or a `sqlite:` URL. Uses PostgREST when unset.
    #[arg(long, env = "LEDGER_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most recent movements
    List {
        #[arg(long, default_value_t = RECENT_ROWS)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the balance and per-category totals
    Summary {
        /// Also show the dollar blue quote
        #[arg(long)]
        rate: bool,
    },
    /// Record a new movement
    Add {
        /// ingreso | egreso
        #[arg(long)]
        direction: Option<String>,
        /// Category token, e.g. alimentos, trabajo, otros
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        /// YYYY-MM-DD or RFC 3339; defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Change fields of an existing movement
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        direction: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<String>,
    },
    /// Delete a movement
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the latest dollar quote
    Rate {
        /// blue | oficial
        #[arg(long, default_value = "blue")]
        market: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ledger_core=info"));
    let json = std::env::var("LEDGER_LOG_FORMAT").is_ok_and(|format| format == "json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_id(s: &str) -> Result<TransactionId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid transaction ID: {}", s))
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    fecha::parse(s).ok_or_else(|| anyhow::anyhow!("Invalid date: {} (expected YYYY-MM-DD)", s))
}

fn parse_direction(s: Option<&str>) -> Result<Option<Direction>> {
    Ok(s.map(str::parse::<Direction>).transpose()?)
}

fn parse_category(s: Option<&str>) -> Result<Option<Category>> {
    Ok(s.map(str::parse::<Category>).transpose()?)
}

async fn open_ledger(config: &Config) -> Result<MutationCoordinator<Backend>> {
    let owner_id = config.require_owner()?.clone();
    let backend = Backend::connect(config.require_backend()?).await?;
    let coordinator = MutationCoordinator::new(backend, owner_id);
    coordinator.load().await?;
    Ok(coordinator)
}

async fn print_rate(config: &Config, market: Market) {
    let rates = BluelyticsRates::new(&config.rates_url);
    match rates.latest(market).await {
        Ok(quote) => println!("{}", output::render_quote(&quote)),
        Err(e) => {
            tracing::warn!(error = %e, "quote lookup failed");
            println!("{}: no disponible", market.label());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env(cli.owner, cli.database_url)?;

    match cli.command {
        Commands::List { limit, json } => {
            let ledger = open_ledger(&config).await?;
            let view = ledger.view();
            let rows = view.recent(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(rows)?);
            } else {
                print!("{}", output::render_table(rows));
            }
        }

        Commands::Summary { rate } => {
            let ledger = open_ledger(&config).await?;
            print!("{}", output::render_summary(&ledger.view()));
            if rate {
                println!();
                print_rate(&config, Market::Blue).await;
            }
        }

        Commands::Add {
            direction,
            category,
            amount,
            name,
            reason,
            date,
        } => {
            let draft = TransactionDraft {
                name,
                reason,
                date: date.as_deref().map(parse_date).transpose()?,
                direction: parse_direction(direction.as_deref())?,
                category: parse_category(category.as_deref())?,
                amount,
            };
            let ledger = open_ledger(&config).await?;
            let created = ledger.create(&draft).await?;
            println!("✓ Movimiento registrado: {}", output::describe(&created));
        }

        Commands::Edit {
            id,
            name,
            reason,
            date,
            direction,
            category,
            amount,
        } => {
            let id = parse_id(&id)?;
            let mut fields = Vec::new();
            fields.extend(name.map(EditField::Name));
            fields.extend(reason.map(EditField::Reason));
            if let Some(date) = date {
                fields.push(EditField::Date(parse_date(&date)?));
            }
            fields.extend(parse_direction(direction.as_deref())?.map(EditField::Direction));
            fields.extend(parse_category(category.as_deref())?.map(EditField::Category));
            fields.extend(amount.map(EditField::Amount));

            let ledger = open_ledger(&config).await?;
            let current = ledger.get(id).await.ok_or(LedgerError::NotFound(id))?;

            let mut session = EditSession::new();
            session.open(current)?;
            for field in fields {
                session.edit(field)?;
            }
            let columns = session.diff()?.columns();
            let saved = session.submit(&ledger).await?;

            if columns.is_empty() {
                println!("Sin cambios: {}", output::describe(&saved));
            } else {
                println!(
                    "✓ Movimiento actualizado ({}): {}",
                    columns.join(", "),
                    output::describe(&saved)
                );
            }
        }

        Commands::Delete { id, yes } => {
            let id = parse_id(&id)?;
            let ledger = open_ledger(&config).await?;

            let description = match ledger.get(id).await {
                Some(tx) => output::describe(&tx),
                None => format!("#{id}"),
            };
            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt(format!("¿Eliminar {description}?"))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Cancelado.");
                return Ok(());
            }

            ledger.delete(id).await?;
            println!("✓ Movimiento eliminado: {description}");
        }

        Commands::Rate { market } => {
            let market: Market = market.parse()?;
            print_rate(&config, market).await;
        }
    }

    Ok(())
}
