mod channels;
mod checker;
mod config;
mod dual;
mod error;
mod normalize;
mod notify;
mod phone;
mod registry;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use checker::ExclusionChecker;
use config::Config;
use dual::RecordChecker;
use normalize::ContactPermissionResult;
use notify::TermNotifier;
use registry::HttpRegistry;

#[derive(Parser, Debug)]
#[command(name = "rne-check")]
struct Cli {
    /// Path to a config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registry service base URL (overrides the config file)
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Free-form exclusion-registry query by phone number or email
    Query(QueryArgs),
    /// Check a record's phone and email against the registry
    Record(RecordArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Phone number to check (takes precedence over --email)
    #[arg(long)]
    phone: Option<String>,

    /// Email address to check
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// Phone number to check
    #[arg(long)]
    phone: Option<String>,

    /// Email address to check
    #[arg(long)]
    email: Option<String>,

    /// Host record object type, forwarded to the service unmodified
    #[arg(long)]
    object_type: String,

    /// Host record id, forwarded to the service unmodified
    #[arg(long)]
    record_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };

    let service_url = match cli.service_url.or_else(|| config.service_url.clone()) {
        Some(url) => url,
        None => bail!("no registry service URL; set service_url in the config or pass --service-url"),
    };
    let registry = HttpRegistry::new(&service_url);

    match cli.command {
        Command::Query(args) => handle_query(args, &config, &registry).await,
        Command::Record(args) => handle_record(args, &config, &registry).await,
    }
}

async fn handle_query(args: QueryArgs, config: &Config, registry: &HttpRegistry) -> Result<()> {
    let notifier = TermNotifier;
    let mut checker = ExclusionChecker::new(config.utc_offset);

    // Email first: the inputs clear each other, and phone wins when
    // both are given.
    if let Some(email) = &args.email {
        checker.set_email(email);
    }
    if let Some(raw) = &args.phone {
        checker.set_phone(&phone::normalize_lookup_phone(
            raw,
            config.phone_region.as_deref(),
        ));
    }

    if checker.run_check(registry, &notifier).await.is_err() {
        // The notifier already told the user what went wrong.
        std::process::exit(1);
    }

    if let Some(result) = checker.result() {
        render_query_result(result);
    }
    Ok(())
}

fn render_query_result(result: &ContactPermissionResult) {
    println!();
    if !result.message.is_empty() {
        println!("{}", result.message);
    }
    println!("Fecha de consulta: {}", result.query_timestamp_localized);
    println!(
        "Registrado en RNE: {}",
        if result.is_excluded { "Sí" } else { "No" }
    );
    for channel in &result.channels {
        println!("  {:<20} {}", format!("{}:", channel.label), channel.status.as_str());
    }
}

async fn handle_record(args: RecordArgs, config: &Config, registry: &HttpRegistry) -> Result<()> {
    let notifier = TermNotifier;
    let mut checker = RecordChecker::new(&args.object_type, &args.record_id, config.utc_offset);

    if let Some(raw) = &args.phone {
        checker.set_phone(&phone::normalize_lookup_phone(
            raw,
            config.phone_region.as_deref(),
        ));
    }
    if let Some(email) = &args.email {
        checker.set_email(email);
    }

    if checker.run_check(registry, &notifier).await.is_err() {
        std::process::exit(1);
    }

    render_record_report(&checker);
    Ok(())
}

fn render_record_report(checker: &RecordChecker) {
    if checker.has_found_results() {
        println!();
        println!("Resultados:");
        for entry in checker.results_for_display() {
            println!("  {} ({})", entry.type_label, entry.value);
            println!("    SMS:           {}", entry.can_receive_sms);
            println!("    Llamadas:      {}", entry.can_receive_calls);
            println!("    Aplicaciones:  {}", entry.applications);
            if !entry.creation_date.is_empty() {
                println!("    Fecha de consulta: {}", entry.creation_date);
            }
        }
    }

    if checker.has_not_found_results() {
        println!();
        println!("Sin registro:");
        for entry in checker.not_found_results() {
            println!("  {} ({}): {}", entry.type_label, entry.value, entry.message);
        }
    }
}
