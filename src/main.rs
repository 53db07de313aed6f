//! ai-insights CLI application
//!
//! Command-line interface for the ai-insights library.

use ai_insights::api::ResultRow;
use ai_insights::storage::{inspect, schema};
use ai_insights::{Config, CsvConverter, Database, ModelCatalog, report, utils};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ai-insights")]
#[command(about = "Convert the notable AI models dataset to SQL and explore it in SQLite")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the models CSV into SQL INSERT statements
    Convert {
        /// Source CSV file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Generated insert file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Write the PostgreSQL schema for the ai_models table
    Schema {
        /// Generated schema file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create the SQLite database from the SQL files in the data directory
    Setup {
        /// Path to the SQLite database file
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Directory containing schema and insert files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Delete an existing database without asking
        #[arg(long)]
        force: bool,
    },

    /// Run the example queries against the database
    Query {
        /// Path to the SQLite database file
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Search term for the search example
        #[arg(long, default_value = "GPT")]
        search: String,

        /// Print one JSON object per query instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Check database structure and data integrity
    Check {
        /// Path to the SQLite database file
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Convert {
            input,
            output,
            no_progress,
        } => {
            if let Some(input) = input {
                config.csv_path = input;
            }
            if let Some(output) = output {
                config.insert_output = output;
            }
            if no_progress {
                config.show_progress = false;
            }
            convert_command(config)
        }
        Commands::Schema { output } => {
            if let Some(output) = output {
                config.schema_output = output;
            }
            schema_command(&config)
        }
        Commands::Setup {
            db_path,
            data_dir,
            force,
        } => {
            if let Some(db_path) = db_path {
                config.db_path = db_path;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            setup_command(&config, force)
        }
        Commands::Query {
            db_path,
            search,
            json,
        } => {
            if let Some(db_path) = db_path {
                config.db_path = db_path;
            }
            query_command(&config, &search, json)
        }
        Commands::Check { db_path } => {
            if let Some(db_path) = db_path {
                config.db_path = db_path;
            }
            check_command(&config)
        }
    }
}

fn convert_command(config: Config) -> Result<ExitCode> {
    let input = config.csv_path.clone();
    let output = config.insert_output.clone();

    if !input.exists() {
        bail!(
            "Could not find '{}'. Please make sure the CSV file exists in the correct location.",
            input.display()
        );
    }

    let converter = CsvConverter::new(Some(config));
    let report = converter
        .convert_file(&input, &output)
        .context("Conversion failed")?;

    println!("✅ Conversion completed successfully!");
    println!("   📄 SQL INSERT statements written to: {}", output.display());
    println!("   📊 Total records processed: {}", report.total_records);
    println!("   ✍️  Statements written: {}", report.written);
    if report.failure_count() > 0 {
        println!("   ⚠️  Skipped records: {}", report.failure_count());
    }

    Ok(ExitCode::SUCCESS)
}

fn schema_command(config: &Config) -> Result<ExitCode> {
    let output = &config.schema_output;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        utils::ensure_directory(parent)?;
    }

    std::fs::write(output, schema::create_table_postgres())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✅ Schema written to: {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn setup_command(config: &Config, force: bool) -> Result<ExitCode> {
    let db_path = std::path::absolute(&config.db_path)?;
    let data_dir = std::path::absolute(&config.data_dir)?;

    if !data_dir.exists() {
        log::error!("Data directory does not exist: {}", data_dir.display());
        return Ok(ExitCode::FAILURE);
    }

    if db_path.exists() {
        if force {
            log::info!("Removing existing database: {}", db_path.display());
        } else if !confirm(&format!(
            "Database {} already exists. Overwrite? (y/N): ",
            db_path.display()
        ))? {
            log::info!("Database setup cancelled");
            return Ok(ExitCode::SUCCESS);
        }
        std::fs::remove_file(&db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
    }

    if let Some(parent) = db_path.parent() {
        utils::ensure_directory(parent)?;
    }

    log::info!("Setting up database: {}", db_path.display());
    let mut db = Database::new(&db_path)?.with_max_logged_failures(config.max_logged_failures);
    let report = db.setup(&data_dir).context("Database setup failed")?;

    if report.failure_count() > 0 {
        log::warn!("{} statements failed and were skipped", report.failure_count());
    }
    log::info!("Database setup completed successfully: {}", db_path.display());
    Ok(ExitCode::SUCCESS)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn query_command(config: &Config, search: &str, json: bool) -> Result<ExitCode> {
    let catalog = ModelCatalog::open(&config.db_path)
        .with_context(|| format!("Error opening {}", config.db_path.display()))?;

    let sections: Vec<(String, Vec<ResultRow>)> = vec![
        ("📅 Models by Publication Year".to_string(), catalog.models_by_year(Some(10))?),
        ("🔢 Largest Models by Parameter Count".to_string(), catalog.largest_models(Some(10))?),
        (
            "🏢 Top Organizations by Model Count".to_string(),
            catalog.models_by_organization(Some(10))?,
        ),
        ("🚀 Recent Frontier Models".to_string(), catalog.frontier_models(Some(15))?),
        ("🎯 Models by Domain".to_string(), catalog.models_by_domain(None, None)?),
        (
            "💬 Recent Language Models".to_string(),
            catalog.models_by_domain(Some("Language"), Some(10))?,
        ),
        ("💰 Most Expensive Models to Train".to_string(), catalog.training_cost_analysis(None)?),
        ("🆕 Models from Last Year".to_string(), catalog.recent_models(Some(365), Some(15))?),
        (format!("🔍 Models related to '{}'", search), catalog.search_models(search, Some(10))?),
    ];

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        for (title, rows) in &sections {
            let rows: Vec<_> = rows.iter().map(ResultRow::to_json).collect();
            writeln!(out, "{}", serde_json::json!({ "title": title, "rows": rows }))?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    writeln!(out, "🤖 AI Models Database Query Examples")?;
    writeln!(out, "=====================================")?;
    for (title, rows) in &sections {
        report::render_table(&mut out, title, rows)?;
    }
    writeln!(out)?;
    writeln!(out, "✅ Query examples completed successfully!")?;
    writeln!(out, "Database: {}", config.db_path.display())?;

    Ok(ExitCode::SUCCESS)
}

fn check_command(config: &Config) -> Result<ExitCode> {
    let db_path: &Path = &config.db_path;
    log::info!("Testing database: {}", db_path.display());

    if !db_path.exists() {
        bail!("Database file not found: {}", db_path.display());
    }

    let db = Database::new(db_path).context("Failed to connect to database")?;
    log::info!("Successfully connected to database: {}", db_path.display());

    let tables = inspect::table_info(db.connection())?;
    if tables.is_empty() {
        log::warn!("No tables found in the database");
        return Ok(ExitCode::FAILURE);
    }

    inspect::integrity_report(db.connection())?;

    if inspect::table_exists(db.connection(), schema::TABLE_NAME)? {
        log::info!("Running sample queries...");
        let catalog = ModelCatalog::from_connection(db.into_connection());

        log::info!("Top 5 models by parameter count:");
        for row in catalog.largest_models(Some(5))? {
            log::info!(
                "  - {} ({}): {} parameters",
                row.get_str("model").unwrap_or("?"),
                row.get_str("organization").unwrap_or("?"),
                row.get_f64("parameters").map(utils::format_thousands).unwrap_or_default()
            );
        }

        log::info!("Models by publication year:");
        for row in catalog.models_by_year(Some(5))? {
            log::info!(
                "  - {}: {} models",
                row.get_str("year").unwrap_or("?"),
                row.get_i64("model_count").unwrap_or(0)
            );
        }

        log::info!("Top organizations by model count:");
        for row in catalog.models_by_organization(Some(5))? {
            log::info!(
                "  - {}: {} models",
                row.get_str("organization").unwrap_or("?"),
                row.get_i64("model_count").unwrap_or(0)
            );
        }
    } else {
        log::info!("ai_models table not found, skipping sample queries");
    }

    let total_rows: usize = tables.iter().map(|t| t.row_count).sum();
    log::info!("Database test completed successfully!");
    log::info!("Summary: {} tables, {} total rows", tables.len(), total_rows);

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["ai-insights", "setup", "--force", "--db-path", "x.db"]);
        assert!(cli.is_ok());

        match cli.unwrap().command {
            Commands::Setup { db_path, force, .. } => {
                assert!(force);
                assert_eq!(db_path, Some(PathBuf::from("x.db")));
            }
            _ => panic!("Expected setup command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["ai-insights", "query", "--config", "c.json", "--json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["ai-insights", "encode"]).is_err());
    }
}
