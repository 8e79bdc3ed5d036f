use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roster_core::{Catalog, CatalogSource, HttpCatalogSource, SelectionController};
use shared::{domain::StudentId, error::DrawError};
use storage::SqliteStore;
use tracing::info;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Draw duty students at random from a catalog")]
struct Args {
    /// Base URL of the student catalog service.
    #[arg(long)]
    catalog_url: Option<String>,
    /// SQLite database holding selection state.
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the catalog, marking selected and last-drawn students.
    List,
    /// Add or remove a student from the selection set.
    Toggle { id: i64 },
    /// Draw one selected student, avoiding an immediate repeat.
    Draw,
    /// Draw N distinct selected students without replacement.
    DrawN { n: usize },
    /// Draw one student from the whole catalog, ignoring the selection.
    DrawAny,
    /// Print the current selection size.
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.catalog_url {
        settings.catalog_url = url;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }

    let database_url = prepare_database_url(&settings.database_url)?;
    let store = Arc::new(SqliteStore::new(&database_url).await?);
    store.health_check().await?;

    let source = HttpCatalogSource::new(settings.catalog_url);
    let students = source.fetch_students().await?;
    let catalog = Catalog::new(students);
    info!(count = catalog.len(), "catalog loaded");

    let mut controller = SelectionController::load(catalog, store).await?;

    match args.command {
        Command::List => {
            if controller.catalog().is_empty() {
                println!("catalog is empty");
            }
            for student in controller.catalog().students() {
                let selected = if controller.is_selected(student.id) {
                    "*"
                } else {
                    " "
                };
                let last = if controller.last_drawn() == Some(student.id) {
                    " (last drawn)"
                } else {
                    ""
                };
                println!("{selected} {:>4}  {}{last}", student.id.0, student.name);
            }
        }
        Command::Toggle { id } => {
            let id = StudentId(id);
            controller.toggle(id).await;
            if controller.is_selected(id) {
                println!("selected {}", id.0);
            } else {
                println!("unselected {}", id.0);
            }
        }
        Command::Draw => match controller.draw_one().await {
            Ok(student) => println!("{} (id={})", student.name, student.id.0),
            Err(error) => report_draw_error(error),
        },
        Command::DrawN { n } => match controller.draw_n(n).await {
            Ok(students) => {
                for student in students {
                    println!("{} (id={})", student.name, student.id.0);
                }
            }
            Err(error) => report_draw_error(error),
        },
        Command::DrawAny => match controller.draw_any().await {
            Ok(student) => println!("{} (id={})", student.name, student.id.0),
            Err(error) => report_draw_error(error),
        },
        Command::Count => println!(
            "{} of {} students selected",
            controller.selection_count(),
            controller.catalog().len()
        ),
    }

    Ok(())
}

fn report_draw_error(error: DrawError) {
    eprintln!("{error}");
    std::process::exit(1);
}
