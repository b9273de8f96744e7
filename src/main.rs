use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::{Path, PathBuf};

use scd_multicast::address::display_vlan;
use scd_multicast::config_loader;
use scd_multicast::document::{load_document, save_document, select_publishers, HostDocument, PublisherFilter};
use scd_multicast::orchestrator::AllocationEngine;
use scd_multicast::vlan::{self, UseCase, VlanAllocationRecord, VlanAllocationStore};

/// Multicast MAC, APPID and VLAN allocation for GOOSE and Sampled Value publishers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the allocation configuration YAML file (defaults to production ranges)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate addresses for the selected publishers
    Allocate(AllocateArgs),
    /// List the VLAN allocation records of a document
    Vlans {
        #[arg(short, long)]
        document: PathBuf,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a VLAN allocation record
    RemoveVlan {
        #[arg(short, long)]
        document: PathBuf,
        #[arg(long, value_enum)]
        use_case: UseCaseArg,
        #[arg(long)]
        service_name: String,
        /// Bus of a bus-scoped record; omit it for station records and the shared "no bus" record
        #[arg(long)]
        bus: Option<String>,
        /// Write the result here instead of overwriting the document
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy the VLAN allocation container from one document to another
    Transfer {
        #[arg(long)]
        from: PathBuf,
        #[arg(long)]
        to: PathBuf,
        /// Write the result here instead of overwriting the target
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
struct AllocateArgs {
    /// Substation document (YAML)
    #[arg(short, long)]
    document: PathBuf,

    /// Write the result here instead of overwriting the document
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exclude GOOSE publishers
    #[arg(long)]
    no_goose: bool,

    /// Exclude Sampled Value publishers
    #[arg(long)]
    no_smv: bool,

    /// Exclude protection group 1
    #[arg(long)]
    no_prot1: bool,

    /// Exclude protection group 2
    #[arg(long)]
    no_prot2: bool,

    /// Only publishers whose device is connected to this bus
    #[arg(long)]
    bus: Option<String>,

    /// Also select publishers without a communication address
    #[arg(long)]
    include_unaddressed: bool,

    /// Explicit `IED/control block` to allocate (repeatable)
    #[arg(long = "publisher")]
    publishers: Vec<String>,

    /// Compute and print the allocation without writing
    #[arg(long)]
    dry_run: bool,
}

impl AllocateArgs {
    fn filter(&self) -> PublisherFilter {
        PublisherFilter {
            goose: !self.no_goose,
            sampled_values: !self.no_smv,
            protection1: !self.no_prot1,
            protection2: !self.no_prot2,
            bus: self.bus.clone(),
            hide_unaddressed: !self.include_unaddressed,
            identities: self.publishers.clone(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum UseCaseArg {
    Station,
    Bus,
}

impl From<UseCaseArg> for UseCase {
    fn from(arg: UseCaseArg) -> Self {
        match arg {
            UseCaseArg::Station => UseCase::Station,
            UseCaseArg::Bus => UseCase::Bus,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let config = config_loader::load_config_or_default(args.config.as_deref())?;

    // RUST_LOG still overrides the configured level
    env_logger::Builder::from_env(Env::default().default_filter_or(config.general.log_level.as_str())).init();

    match args.command {
        Command::Allocate(allocate) => {
            let engine = AllocationEngine::from_config(&config);
            run_allocate(&engine, &allocate)
        }
        Command::Vlans { document, json } => list_vlans(&document, json),
        Command::RemoveVlan {
            document,
            use_case,
            service_name,
            bus,
            output,
        } => remove_vlan(&document, use_case.into(), &service_name, bus.as_deref(), output.as_deref()),
        Command::Transfer { from, to, output } => run_transfer(&from, &to, output.as_deref()),
    }
}

fn run_allocate(engine: &AllocationEngine, args: &AllocateArgs) -> Result<()> {
    let mut doc = load_document(&args.document)?;

    let selected = select_publishers(&doc, &args.filter(), engine.resolver());
    if selected.is_empty() {
        warn!("No publishers match the selection");
        return Ok(());
    }
    info!("Selected {} publishers", selected.len());

    let report = if args.dry_run {
        engine.plan(&doc, &selected, &scd_multicast::utils::now_timestamp())
    } else {
        engine
            .run(&mut doc, &selected)
            .wrap_err("Failed to apply allocation to document")?
    };

    for assignment in &report.assignments {
        println!(
            "{:<40} MAC {}  APPID {}  VLAN {}  PRIO {}",
            assignment.publisher.to_string(),
            assignment.mac,
            assignment.appid,
            assignment.vlan_id.as_deref().map(display_vlan).unwrap_or_else(|| "-".to_string()),
            assignment.vlan_priority
        );
    }
    for exhausted in &report.exhausted {
        warn!("{}", exhausted);
    }
    if !report.unclassified.is_empty() {
        info!("{} publishers have no shared VLAN classification", report.unclassified.len());
    }
    if !report.skipped_unaddressed.is_empty() {
        info!("{} publishers skipped without address record", report.skipped_unaddressed.len());
    }
    if !report.vlans_created.is_empty() {
        info!("{} new VLAN allocations", report.vlans_created.len());
    }

    if args.dry_run {
        info!("Dry run, document not written");
        return Ok(());
    }

    let output = args.output.as_deref().unwrap_or(&args.document);
    save_document(&doc, output)?;
    info!("Allocation completed successfully");
    Ok(())
}

fn describe(record: &VlanAllocationRecord) -> String {
    match &record.bus_name {
        Some(bus) => format!("{} {} - {}", record.service_name, record.service_type, bus),
        None => format!("{} {}", record.service_name, record.service_type),
    }
}

fn list_vlans(document: &Path, json: bool) -> Result<()> {
    let doc = load_document(document)?;
    let store = VlanAllocationStore::load(&doc);

    if json {
        let records = store.records();
        println!("{}", serde_json::to_string_pretty(&records).wrap_err("Failed to serialize VLAN records")?);
        return Ok(());
    }

    if store.count() == 0 {
        println!("No VLAN allocations");
        return Ok(());
    }
    if let Some(updated) = store.updated() {
        println!("Last updated: {}", updated);
    }
    for record in store.records() {
        println!(
            "{:<8} {:<45} P1 {:<14} P2 {}",
            record.use_case.to_string(),
            describe(record),
            display_vlan(&record.prot1_id),
            display_vlan(&record.prot2_id)
        );
    }
    Ok(())
}

fn remove_vlan(
    document: &Path,
    use_case: UseCase,
    service_name: &str,
    bus: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    if use_case == UseCase::Station && bus.is_some() {
        bail!("--bus only applies to bus VLAN allocations");
    }

    let mut doc = load_document(document)?;
    let mut store = VlanAllocationStore::load(&doc);

    let targets = store.records_named(use_case, service_name, bus);
    if targets.is_empty() {
        warn!(
            "No {} VLAN allocation named '{}' on bus {}",
            use_case,
            service_name,
            bus.unwrap_or("(none)")
        );
        return Ok(());
    }

    let removed = store.remove(&targets);
    if let Some(edit) = store.to_edit() {
        doc.apply(&[edit]).wrap_err("Failed to update VLAN allocations")?;
    }

    save_document(&doc, output.unwrap_or(document))?;
    println!("Removed {} VLAN allocation(s)", removed);
    Ok(())
}

fn run_transfer(from: &Path, to: &Path, output: Option<&Path>) -> Result<()> {
    let source = load_document(from)?;
    let mut target = load_document(to)?;

    let outcome = vlan::transfer(&source, &mut target)
        .wrap_err_with(|| format!("VLAN transfer from {:?} to {:?} failed", from, to))?;

    save_document(&target, output.unwrap_or(to))?;
    if outcome.replaced_existing {
        println!("Replaced existing VLAN allocations with {} records", outcome.records);
    } else {
        println!("Transferred {} VLAN allocation records", outcome.records);
    }
    Ok(())
}
