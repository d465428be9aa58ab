use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use routing_reports::io::csv_write;
use routing_reports::model::RoutingWeek;
use routing_reports::report;
use routing_reports::schema::VolumeSchema;
use routing_reports::{ReportError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Report(args) => execute_report(args),
        Command::Mails(args) => execute_mails(args),
    }
}

fn execute_report(args: ReportArgs) -> Result<()> {
    for path in [&args.volume, &args.sectors, &args.orders] {
        require_input(path)?;
    }

    let schema = match &args.schema {
        Some(path) => VolumeSchema::from_file(path)?,
        None => VolumeSchema::default(),
    };
    let cutoff = resolve_week(args.week)?;

    let table = report::moved_orders_report(
        &args.volume,
        &args.sectors,
        &args.orders,
        cutoff,
        &schema,
    )?;
    csv_write::write_table(&args.output, &table)?;
    println!("report written to {}", args.output.display());
    Ok(())
}

fn execute_mails(args: MailArgs) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(ReportError::MissingInput(args.dir));
    }
    let cutoff = resolve_week(args.week)?;

    let table = report::routing_mails_report(&args.dir, cutoff)?;
    csv_write::write_table(&args.output, &table)?;
    println!("report written to {}", args.output.display());
    Ok(())
}

fn require_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }
    Ok(())
}

fn resolve_week(week: Option<String>) -> Result<RoutingWeek> {
    let value = match week {
        Some(value) => value,
        None => prompt_week()?,
    };
    RoutingWeek::parse(&value)
}

/// Asks for the cutover week on stdin. A blank entry offers one retry;
/// declining it cancels the run.
fn prompt_week() -> Result<String> {
    for attempt in 0..2 {
        print!("Versionswechsel im Format JJJJWW eingeben: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        let entry = line.trim();
        if !entry.is_empty() {
            return Ok(entry.to_string());
        }
        if attempt == 0 {
            print!("Keine Woche eingegeben. Nochmal versuchen? (j/n) ");
            std::io::stdout().flush()?;
            let mut answer = String::new();
            std::io::stdin().read_line(&mut answer)?;
            if !answer.trim().eq_ignore_ascii_case("j") {
                return Err(ReportError::UserCancelled);
            }
        }
    }
    Err(ReportError::UserCancelled)
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| ReportError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate postal routing exports into per-agent reports."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the moved-orders report from the volume, sector, and order exports.
    Report(ReportArgs),
    /// Build the routing-confirmation report from a folder of saved mails.
    Mails(MailArgs),
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Volume export (Volumenauswertung) with the two-row header.
    #[arg(long)]
    volume: PathBuf,

    /// Changed-sectors export with a ZGB-PLZ column.
    #[arg(long)]
    sectors: PathBuf,

    /// Orders export with number, name, and routing-week columns.
    #[arg(long)]
    orders: PathBuf,

    /// Cutover week in JJJJWW form; prompted for when omitted.
    #[arg(long)]
    week: Option<String>,

    /// Output report path.
    #[arg(long)]
    output: PathBuf,

    /// Optional JSON file overriding the built-in spreadsheet layout.
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(clap::Args)]
struct MailArgs {
    /// Folder containing saved routing-confirmation mail bodies.
    #[arg(long)]
    dir: PathBuf,

    /// Cutover week in JJJJWW form; prompted for when omitted.
    #[arg(long)]
    week: Option<String>,

    /// Output report path.
    #[arg(long)]
    output: PathBuf,
}
