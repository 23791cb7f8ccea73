use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use sqlgrid::config;
use sqlgrid::error::SqlgridError;
use sqlgrid::workbench::{EditOutcome, Workbench};
use sqlgrid_db::{Cell, Grid};
use sqlgrid_export::ExportFormat;
use std::path::PathBuf;

/// Browse, edit and export SQLite databases.
#[derive(Parser, Debug)]
#[command(name = "sqlgrid", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to $SQLGRID_CONFIG, then ./sqlgrid.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a database file and make it the current session
    Open { file: PathBuf },

    /// List the tables of the current session
    Tables,

    /// Print a table; editable columns are marked with `*`
    Show { table: String },

    /// Change one cell, identified by its row's primary key
    Edit {
        table: String,
        column: String,
        /// Primary-key value of the row to change
        #[arg(long)]
        key: String,
        /// New value
        #[arg(
            required_unless_present = "null",
            conflicts_with = "null",
            allow_hyphen_values = true
        )]
        value: Option<String>,
        /// Set the cell to NULL
        #[arg(long)]
        null: bool,
    },

    /// Write the database snapshot
    Save {
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Export one table
    Export {
        table: String,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Export every table as CSV inside one ZIP archive
    ExportAll {
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show the current session
    Status,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Xlsx,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Xlsx => ExportFormat::Xlsx,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), SqlgridError> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::load(cli.config.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let mut workbench = Workbench::start(config);
    let result = run(&mut workbench, cli.command).await;
    workbench.shutdown().await;
    result
}

async fn run(workbench: &mut Workbench, command: Command) -> Result<(), SqlgridError> {
    match command {
        Command::Open { file } => {
            let tables = workbench.open_file(&file).await?;
            print_lines(&tables);
        }
        Command::Tables => print_lines(&workbench.tables()?),
        Command::Show { table } => print_grid(&workbench.show_table(&table)?),
        Command::Edit {
            table,
            column,
            key,
            value,
            null,
        } => {
            let new_value = match value {
                Some(value) if !null => Cell::from(value),
                _ => Cell::Null,
            };
            match workbench.edit_cell(&table, &column, &key, new_value).await? {
                EditOutcome::Applied(grid) => {
                    info!("Updated {table}.{column} where key = {key}");
                    print_grid(&grid);
                }
                EditOutcome::Reverted { error, grid } => {
                    print_grid(&grid);
                    return Err(error.into());
                }
            }
        }
        Command::Save { output } => {
            let path = workbench.save(output.as_deref()).await?;
            println!("{}", path.display());
        }
        Command::Export {
            table,
            format,
            output,
        } => {
            let path = workbench
                .export_table(&table, format.into(), output.as_deref())
                .await?;
            println!("{}", path.display());
        }
        Command::ExportAll { output } => {
            let path = workbench.export_all(output.as_deref()).await?;
            println!("{}", path.display());
        }
        Command::Status => {
            let status = workbench.status()?;
            println!("name:   {}", status.display_name);
            println!("size:   {} bytes", status.size);
            println!("tables: {}", status.tables);
            if status.dirty {
                warn!("Session has unsaved edits");
            }
        }
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn print_grid(grid: &Grid) {
    let header: Vec<String> = grid
        .table
        .columns
        .iter()
        .map(|column| {
            if grid.is_editable(&column.name) {
                format!("{}*", column.name)
            } else {
                column.name.clone()
            }
        })
        .collect();
    println!("{}", header.join("\t"));
    for row in &grid.rows {
        let cells: Vec<String> = row.iter().map(Cell::to_string).collect();
        println!("{}", cells.join("\t"));
    }
}
