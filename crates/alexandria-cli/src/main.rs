use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alexandria_core::{
    isbn, worker, BookRecord, BookStore, Catalog, Command, Config, GoogleBooksProvider, Notice,
};

#[derive(Parser)]
#[command(name = "alexandria")]
#[command(version, about = "Catalog physical books by ISBN", long_about = None)]
struct Cli {
    /// Database file (overrides the configured path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch a book by ISBN, preview it, and add it to the catalog
    Add {
        /// ISBN-10 or ISBN-13
        isbn: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Fetch and preview a book without adding it
    Lookup {
        /// ISBN-10 or ISBN-13
        isbn: String,
    },
    /// Add a previously previewed book to the catalog
    Save {
        /// ISBN-10 or ISBN-13
        isbn: String,
    },
    /// Remove a book from the catalog
    Delete {
        /// ISBN-10 or ISBN-13
        isbn: String,
    },
    /// List all books in the catalog
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Search the catalog by title or subtitle
    Search {
        /// Substring to look for (at least 2 characters)
        query: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alexandria=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let db_path = match cli.db {
        Some(path) => path,
        None => config.database_path()?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let store = BookStore::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;
    let provider = GoogleBooksProvider::with_base_url(config.api.base_url.clone());
    let catalog = Catalog::new(Box::new(provider), store);
    let worker::CatalogHandle {
        commands,
        mut notices,
    } = worker::spawn(catalog);

    // Every invocation is an application start, so purge stale previews
    // before doing anything else. The one exception is `save`: it confirms
    // a preview staged by an earlier `lookup`, which the sweep would eat.
    if !matches!(cli.command, Commands::Save { .. }) {
        commands.send(Command::Sweep).await?;
        match await_notice(&mut notices).await? {
            Notice::Swept(count) => tracing::debug!(count, "startup sweep done"),
            other => bail!("unexpected notice during sweep: {:?}", other),
        }
    }

    match cli.command {
        Commands::Add { isbn, yes } => {
            let Some(ean) = isbn::normalize(&isbn) else {
                println!("{}", notice_line(&Notice::InvalidIsbn));
                return Ok(());
            };

            commands.send(Command::Fetch { isbn: ean.clone() }).await?;
            match await_notice(&mut notices).await? {
                Notice::Fetched(record) => {
                    print_preview(&record);
                    if yes || prompt_save()? {
                        commands.send(Command::Confirm { isbn: ean }).await?;
                        let notice = await_notice(&mut notices).await?;
                        println!("{}", notice_line(&notice));
                    } else {
                        println!("Not saved. The preview will be discarded.");
                    }
                }
                other => println!("{}", notice_line(&other)),
            }
        }
        Commands::Lookup { isbn } => {
            let Some(ean) = isbn::normalize(&isbn) else {
                println!("{}", notice_line(&Notice::InvalidIsbn));
                return Ok(());
            };

            commands.send(Command::Fetch { isbn: ean.clone() }).await?;
            match await_notice(&mut notices).await? {
                Notice::Fetched(record) => {
                    print_preview(&record);
                    println!("Run `alexandria save {}` to add it to the catalog.", ean);
                }
                other => println!("{}", notice_line(&other)),
            }
        }
        Commands::Save { isbn } => {
            let Some(ean) = isbn::normalize(&isbn) else {
                println!("{}", notice_line(&Notice::InvalidIsbn));
                return Ok(());
            };

            commands.send(Command::Confirm { isbn: ean }).await?;
            drop(commands);
            // A confirm that matched nothing is a silent no-op
            while let Some(notice) = notices.recv().await {
                println!("{}", notice_line(&notice));
            }
            return Ok(());
        }
        Commands::Delete { isbn } => {
            let Some(ean) = isbn::normalize(&isbn) else {
                println!("{}", notice_line(&Notice::InvalidIsbn));
                return Ok(());
            };

            commands.send(Command::Delete { isbn: ean }).await?;
            drop(commands);
            while let Some(notice) = notices.recv().await {
                println!("{}", notice_line(&notice));
            }
            return Ok(());
        }
        Commands::List { json } => {
            drop(commands);
            let store = BookStore::open(&db_path)?;
            print_records(&store.list_saved()?, json)?;
        }
        Commands::Search { query, json } => {
            let query = query.trim().to_string();
            if query.len() < 2 {
                println!("Enter at least 2 characters to search.");
                return Ok(());
            }
            drop(commands);
            let store = BookStore::open(&db_path)?;
            print_records(&store.search_saved(&query)?, json)?;
        }
    }

    Ok(())
}

/// Next worker notice; end-of-stream means the worker hit a store error.
async fn await_notice(notices: &mut UnboundedReceiver<Notice>) -> anyhow::Result<Notice> {
    notices
        .recv()
        .await
        .context("catalog worker stopped unexpectedly (see log output)")
}

fn notice_line(notice: &Notice) -> String {
    match notice {
        Notice::Fetched(record) => format!("Found \"{}\".", record.title),
        Notice::AlreadySaved => "This book is already in your catalog.".to_string(),
        Notice::Saved => "Book saved.".to_string(),
        Notice::Deleted => "Book deleted.".to_string(),
        Notice::NotFound => "No book found for that ISBN.".to_string(),
        Notice::NetworkUnavailable => "No network connection. Try again later.".to_string(),
        Notice::InvalidIsbn => "Enter a valid ISBN-10 or ISBN-13.".to_string(),
        Notice::Swept(count) => format!("Discarded {} stale preview(s).", count),
    }
}

fn print_preview(record: &BookRecord) {
    if record.subtitle.is_empty() {
        println!("{}", record.title);
    } else {
        println!("{}: {}", record.title, record.subtitle);
    }
    println!("  ISBN:       {}", record.isbn);
    if !record.authors.is_empty() {
        println!("  Authors:    {}", record.authors.join(", "));
    }
    if !record.categories.is_empty() {
        println!("  Categories: {}", record.categories.join(", "));
    }
    if !record.cover_url.is_empty() {
        println!("  Cover:      {}", record.cover_url);
    }
    if !record.description.is_empty() {
        println!("\n  {}", record.description);
    }
}

fn print_records(records: &[BookRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No books in the catalog.");
        return Ok(());
    }

    for record in records {
        let byline = if record.authors.is_empty() {
            String::new()
        } else {
            format!(" ({})", record.authors.join(", "))
        };
        if record.subtitle.is_empty() {
            println!("{}  {}{}", record.isbn, record.title, byline);
        } else {
            println!(
                "{}  {} - {}{}",
                record.isbn, record.title, record.subtitle, byline
            );
        }
    }
    Ok(())
}

fn prompt_save() -> anyhow::Result<bool> {
    print!("Save this book to your catalog? [y/N] ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
