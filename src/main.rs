//! cruce CLI - group queries over clinic spreadsheets

use clap::{Parser, Subcommand};
use cruce::{Summary, Workbook};
use cruceql::{Combinator, GroupQuery};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cruce")]
#[command(about = "Cross clinic spreadsheet rows against grouped criteria", long_about = None)]
struct Cli {
    /// Workbook directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workbook: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new workbook
    Init,

    /// Run a group query over a sheet
    Query {
        /// Sheet to query
        sheet: String,

        /// Condition such as `Edad >= 40`; repeat or separate with ';'
        #[arg(short = 'c', long = "where")]
        conditions: Vec<String>,

        /// Match rows satisfying any condition instead of all of them
        #[arg(long)]
        any: bool,

        /// Read the request from a JSON file ({"conditions": [...], "combinator": "and"})
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Print the matching rows as JSON
        #[arg(long)]
        rows: bool,
    },

    /// List the columns of a sheet
    Fields {
        sheet: String,
    },

    /// List the distinct values of a column
    Options {
        sheet: String,
        field: String,
    },

    /// Look up a patient by national ID
    Patient {
        dni: String,
    },

    /// List the prior studies of a patient
    Studies {
        dni: String,
    },

    /// List sheets
    Sheets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_workbook(&cli.workbook).await,
        Commands::Query {
            sheet,
            conditions,
            any,
            json,
            rows,
        } => run_query(&cli.workbook, &sheet, &conditions, any, json.as_deref(), rows).await,
        Commands::Fields { sheet } => list_fields(&cli.workbook, &sheet).await,
        Commands::Options { sheet, field } => list_options(&cli.workbook, &sheet, &field).await,
        Commands::Patient { dni } => show_patient(&cli.workbook, &dni).await,
        Commands::Studies { dni } => list_studies(&cli.workbook, &dni).await,
        Commands::Sheets => list_sheets(&cli.workbook).await,
    }
}

async fn init_workbook(path: &Path) -> anyhow::Result<()> {
    println!("Initializing workbook at {:?}...", path);

    let workbook = Workbook::init(path).await?;

    println!("Workbook initialized successfully!");
    println!();
    println!("Directory structure:");
    println!("  cruce.yaml  - Workbook settings");
    println!("  sheets/     - One JSON file per sheet: {{\"headers\": [...], \"rows\": [[...]]}}");
    println!();
    println!("Patient sheet: {}", workbook.config.patient_sheet);
    println!("Study sheets:  {}", workbook.config.study_sheets.join(", "));
    println!();
    println!("Get started:");
    println!("  cruce query Pacientes --where \"Edad >= 40\" --where \"Sexo IN [F]\"");

    Ok(())
}

/// Build the request from a JSON file and/or textual conditions
async fn build_query(
    conditions: &[String],
    any: bool,
    json: Option<&Path>,
) -> anyhow::Result<GroupQuery> {
    let mut query = match json {
        Some(file) => {
            let content = tokio::fs::read_to_string(file).await?;
            serde_json::from_str(&content)?
        }
        None => GroupQuery::default(),
    };

    if any {
        query.combinator = Combinator::Or;
    }

    for text in conditions {
        let parsed = cruceql::parse_multi(text).map_err(cruce::Error::from)?;
        query = parsed.into_iter().fold(query, GroupQuery::with);
    }

    Ok(query)
}

async fn run_query(
    path: &Path,
    sheet: &str,
    conditions: &[String],
    any: bool,
    json: Option<&Path>,
    rows: bool,
) -> anyhow::Result<()> {
    let workbook = Workbook::open(path).await?;
    let query = build_query(conditions, any, json).await?;

    let result = match workbook.group_query(sheet, &query).await {
        Ok(result) => result,
        Err(e) => {
            if let Some(hint) = e.downcast_ref::<cruce::Error>().and_then(|e| e.suggestion()) {
                eprintln!("Hint: {}", hint);
            }
            return Err(e);
        }
    };

    println!("Criteria ({}):", query.combinator);
    if result.criterios_cruce.is_empty() {
        println!("  (none)");
    }
    for spec in &result.criterios_cruce {
        println!("  {} {} {}", spec.field, spec.operator, spec.value);
    }
    println!();
    println!("{}", Summary::from(&result));

    if rows {
        println!();
        println!("{}", serde_json::to_string_pretty(&result.data)?);
    }

    Ok(())
}

async fn list_fields(path: &Path, sheet: &str) -> anyhow::Result<()> {
    let workbook = Workbook::open(path).await?;
    let fields = workbook.field_catalog(sheet).await?;

    if fields.is_empty() {
        println!("Sheet '{}' has no columns.", sheet);
        return Ok(());
    }

    println!("Fields of '{}':", sheet);
    for field in fields {
        println!("  {}", field);
    }

    Ok(())
}

async fn list_options(path: &Path, sheet: &str, field: &str) -> anyhow::Result<()> {
    let workbook = Workbook::open(path).await?;
    let options = workbook.field_options(sheet, field).await?;

    if options.is_empty() {
        println!("No values found.");
        return Ok(());
    }

    for value in &options {
        println!("  {}", value);
    }
    println!("({} distinct value(s))", options.len());

    Ok(())
}

async fn show_patient(path: &Path, dni: &str) -> anyhow::Result<()> {
    let workbook = Workbook::open(path).await?;

    match workbook.find_patient(dni).await? {
        Some(patient) => println!("{}", serde_json::to_string_pretty(&patient)?),
        None => println!("DNI {} not found.", dni.trim()),
    }

    Ok(())
}

async fn list_studies(path: &Path, dni: &str) -> anyhow::Result<()> {
    let workbook = Workbook::open(path).await?;
    let studies = workbook.patient_studies(dni).await?;

    if studies.is_empty() {
        println!("No studies found.");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&studies)?);

    Ok(())
}

async fn list_sheets(path: &Path) -> anyhow::Result<()> {
    let workbook = Workbook::open(path).await?;
    let titles = workbook.sheet_titles();

    if titles.is_empty() {
        println!("No sheets found.");
        return Ok(());
    }

    println!("Sheets:");
    for title in titles {
        println!("  {}", title);
    }

    Ok(())
}
