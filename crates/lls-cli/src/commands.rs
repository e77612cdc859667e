use std::fs::File;
use std::io;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;
use lls_store::{
    AuditReport, ContentStream, LowLevelStorage, Namespace, RebuildReport, StorageConfig, Store,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = StorageConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    debug!(config = %cli.config.display(), settings = ?config, "loaded configuration");
    let storage = LowLevelStorage::open(&config).context("opening storage")?;
    let format = cli.format;

    match cli.command {
        Command::Add(args) => cmd_add(&storage, args),
        Command::Get(args) => cmd_get(&storage, args),
        Command::Replace(args) => cmd_replace(&storage, args),
        Command::Remove(args) => cmd_remove(&storage, args),
        Command::List(args) => cmd_list(store(&storage, &args), format),
        Command::Rebuild(args) => cmd_rebuild(store(&storage, &args), format),
        Command::Audit(args) => cmd_audit(store(&storage, &args), format),
    }
}

fn store<'a>(storage: &'a LowLevelStorage, args: &NamespaceArgs) -> &'a Store {
    storage.store(if args.datastream {
        Namespace::Datastream
    } else {
        Namespace::Object
    })
}

fn input(args: &WriteArgs) -> anyhow::Result<ContentStream> {
    Ok(match &args.file {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    })
}

fn cmd_add(storage: &LowLevelStorage, args: WriteArgs) -> anyhow::Result<()> {
    let store = store(storage, &args.namespace);
    let path = store.add(&args.key, input(&args)?)?;
    println!("{} Added {} ({})", "✓".green().bold(), args.key.yellow(), store.namespace());
    println!("  Path: {}", path.display().to_string().dimmed());
    Ok(())
}

fn cmd_get(storage: &LowLevelStorage, args: GetArgs) -> anyhow::Result<()> {
    let mut content = store(storage, &args.namespace).retrieve(&args.key)?;
    match &args.output {
        Some(path) => {
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let bytes = io::copy(&mut content, &mut file)?;
            println!("{} Wrote {} bytes to {}", "✓".green().bold(), bytes, path.display());
        }
        None => {
            io::copy(&mut content, &mut io::stdout().lock())?;
        }
    }
    Ok(())
}

fn cmd_replace(storage: &LowLevelStorage, args: WriteArgs) -> anyhow::Result<()> {
    store(storage, &args.namespace).replace(&args.key, input(&args)?)?;
    println!("{} Replaced {}", "✓".green().bold(), args.key.yellow());
    Ok(())
}

fn cmd_remove(storage: &LowLevelStorage, args: KeyArgs) -> anyhow::Result<()> {
    store(storage, &args.namespace).remove(&args.key)?;
    println!("{} Removed {}", "✓".green().bold(), args.key.yellow());
    Ok(())
}

fn cmd_list(store: &Store, format: OutputFormat) -> anyhow::Result<()> {
    let keys = store.list()?;
    match format {
        OutputFormat::Text => {
            for key in keys {
                println!("{}", key?);
            }
        }
        OutputFormat::Json => {
            let keys = keys.collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
    }
    Ok(())
}

fn cmd_rebuild(store: &Store, format: OutputFormat) -> anyhow::Result<()> {
    let report = store.rebuild()?;
    match format {
        OutputFormat::Text => print_rebuild(store.namespace(), &report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn cmd_audit(store: &Store, format: OutputFormat) -> anyhow::Result<()> {
    let report = store.audit()?;
    match format {
        OutputFormat::Text => print_audit(store.namespace(), &report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_rebuild(namespace: Namespace, report: &RebuildReport) {
    println!("{} Rebuilt {} registry", "✓".green().bold(), namespace);
    println!("  Files seen: {}", report.files_seen.to_string().bold());
    println!("  Registered: {}", report.registered.to_string().green());
    if report.skipped > 0 {
        println!("  Skipped:    {}", report.skipped.to_string().yellow());
    }
    if report.duplicates > 0 {
        println!("  Duplicates: {}", report.duplicates.to_string().red());
    }
}

fn print_audit(namespace: Namespace, report: &AuditReport) {
    println!(
        "Audited {} store: {} files, {} registry entries",
        namespace,
        report.files_checked.to_string().bold(),
        report.entries_checked.to_string().bold()
    );
    if report.is_clean() {
        println!("{} No discrepancies.", "✓".green().bold());
        return;
    }
    for finding in &report.findings {
        println!("  {} {}", "✗".red(), finding);
    }
    println!("{} discrepancies found", report.findings.len().to_string().red().bold());
}
