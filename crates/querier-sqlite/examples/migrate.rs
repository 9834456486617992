//! querier migrate demo
//!
//! Migrates a small blog schema into a SQLite database.
//!
//! ```text
//! cargo run -p querier-sqlite --example migrate -- --database sqlite:blog.db?mode=rwc migrate
//! ```

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use querier_core::{FieldDescriptor, Querier, Record, async_trait};
use querier_derive::Record;
use querier_migrate::{DbInfo, MigrateEvent, Migrator, Model};
use querier_sqlite::{SqliteDialect, SqliteExecutor};

/// Additive schema migrations for SQLite.
#[derive(Parser)]
#[command(name = "querier-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables and columns.
    Migrate {
        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the columns of every table.
    Show,

    /// Drop every table.
    Drop,
}

#[derive(Debug, Default, Record)]
struct Author {
    #[db(",INTEGER PRIMARY KEY AUTOINCREMENT")]
    id: i64,
    name: String,
    email: Option<String>,
}

#[derive(Debug, Default, Record)]
struct Timestamps {
    created: Option<chrono::NaiveDateTime>,
    updated: Option<chrono::NaiveDateTime>,
}

#[allow(dead_code)]
#[derive(Debug, Default, Record)]
struct Post {
    #[db(",INTEGER PRIMARY KEY AUTOINCREMENT")]
    id: i64,
    author_id: i64,
    title: String,
    #[db(",TEXT NULL")]
    body: Option<String>,
    times: Timestamps,
    #[db("-")]
    rendered: String,
}

struct Authors;

#[async_trait]
impl Model for Authors {
    fn table_name(&self) -> &str {
        "authors"
    }

    fn fields(&self) -> &'static [FieldDescriptor] {
        Author::FIELDS
    }

    async fn migrate(
        &self,
        q: &mut Querier<'_>,
        event: MigrateEvent<'_>,
    ) -> querier_core::Result<()> {
        if event == MigrateEvent::Created {
            q.write_with("INSERT INTO authors (name) VALUES (?)", ["admin"]);
            q.exec().await?;
            info!(id = ?q.last_insert_id(), "Seeded admin author");
        }
        Ok(())
    }
}

struct Posts;

#[async_trait]
impl Model for Posts {
    fn table_name(&self) -> &str {
        "posts"
    }

    fn fields(&self) -> &'static [FieldDescriptor] {
        Post::FIELDS
    }

    fn create_table(&self, q: &mut Querier<'_>) {
        q.write("FOREIGN KEY (author_id) REFERENCES authors (id)");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let executor = SqliteExecutor::connect(&cli.database).await?;
    let dialect = SqliteDialect::new();
    let models: [&dyn Model; 2] = [&Authors, &Posts];

    match cli.command {
        Commands::Migrate { dry_run } => {
            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }
            let result = Migrator::new(&executor, dialect)
                .dry_run(dry_run)
                .migrate(&models)
                .await?;
            if result.is_empty() {
                info!("No changes detected.");
            }
            for sql in &result.statements {
                println!("{sql};");
            }
        }

        Commands::Show => {
            let mut q = Querier::new(&executor, &dialect);
            for model in models {
                let table = model.table_name();
                let exists = dialect.has_table(&mut q, table).await?;
                q.reset();
                if !exists {
                    println!("{table}: (missing)");
                    continue;
                }
                let columns = dialect.table_columns(&mut q, table).await?;
                q.reset();
                println!("{table}: {}", columns.join(", "));
            }
        }

        Commands::Drop => {
            let mut reversed = models;
            reversed.reverse();
            Migrator::new(&executor, dialect).drop(&reversed).await?;
            info!("Dropped {} tables.", reversed.len());
        }
    }

    Ok(())
}
