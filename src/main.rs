// Kiosk Inventory Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/kiosk-inventory-sim
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/kiosk-inventory-sim --purchase-order PO2024002 --duration-secs 120 --seed 7 --verbose
// ```

use anyhow::{anyhow, Context};
use chrono::Duration;
use kiosk_inventory_sim::catalog::{reference_catalog, Catalog};
use kiosk_inventory_sim::simulation::{
    JsonlEventSink, KioskSimulation, LoggingConfig, LoggingGuard, SimulationSnapshot,
};
use kiosk_inventory_sim::stock_in::ShipmentSummary;
use kiosk_inventory_sim::types::config::CliArgs;
use kiosk_inventory_sim::types::{OutputFormat, PurchaseOrderId, SimulationConfig};
use clap::Parser;
use serde_json::json;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::new().with_level(tracing::Level::WARN).init()
    };
    let _logging_guard: LoggingGuard = match logging_result {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        error!("Kiosk simulation failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    info!("Starting Kiosk Inventory Simulator");

    let list_only = args.list_purchase_orders;
    let dry_run = args.dry_run;
    let config = SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    let output_format = config.get_output_format().map_err(|e| anyhow!(e))?;

    let catalog = reference_catalog().context("Failed to build reference catalog")?;

    if list_only {
        print_purchase_orders(&catalog);
        return Ok(());
    }

    let po_id = match &config.purchase_order {
        Some(id) => PurchaseOrderId::from(id.as_str()),
        None => catalog
            .purchase_orders()
            .first()
            .map(|po| po.id.clone())
            .ok_or_else(|| anyhow!("The catalog has no purchase orders"))?,
    };

    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config, &po_id);
        return Ok(());
    }

    print_startup_banner(&config, &po_id);

    let event_log = config.event_log_output.clone();
    let duration_secs = config.duration_secs;
    let monitoring_enabled = config.monitoring_enabled;

    let mut sim = KioskSimulation::new(config, catalog).context("Failed to initialize simulation")?;
    if let Some(path) = event_log {
        let sink = JsonlEventSink::create(&path).with_context(|| format!("Failed to open event log {}", path))?;
        sim = sim.with_event_sink(Box::new(sink));
        eprintln!("Kiosk events will be written to: {}", path);
    }

    sim.select_purchase_order(&po_id)
        .with_context(|| format!("Failed to select purchase order {}", po_id))?;
    if monitoring_enabled {
        sim.toggle_monitoring()?;
    }
    sim.start_scanning().context("Failed to start scanning")?;

    eprintln!("Running {} simulated seconds...", duration_secs);
    let run_for = i64::try_from(duration_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow!("Duration of {} seconds is out of range", duration_secs))?;
    let fired = sim.advance(run_for)?;
    info!(fired, "Simulated run complete");

    let snapshot = sim.snapshot();
    sim.stop_scanning();
    let summary = sim.finalize_shipment().context("Failed to finalize shipment")?;
    sim.shutdown();

    match output_format {
        OutputFormat::Json => {
            let report = json!({
                "snapshot": snapshot,
                "shipment": summary,
                "statistics": sim.statistics(),
                "notifications": sim.notifications().entries(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            print_reconciliation(&snapshot);
            print_alerts(&snapshot);
            print_shipment_summary(&summary);
            eprintln!("\n{}", sim.statistics().detailed_breakdown());
        }
    }

    info!("Kiosk Inventory Simulator completed successfully");
    Ok(())
}

fn print_startup_banner(config: &SimulationConfig, po_id: &PurchaseOrderId) {
    eprintln!("Kiosk Inventory Simulator");
    eprintln!("=========================");
    eprintln!("Vision stock-in reconciliation and shelf monitoring");
    eprintln!();
    print_configuration_summary(config, po_id);
}

fn print_configuration_summary(config: &SimulationConfig, po_id: &PurchaseOrderId) {
    eprintln!("Configuration:");
    eprintln!("  Purchase Order: {}", po_id);
    eprintln!("  Duration: {}s simulated", config.duration_secs);
    eprintln!("  Scan Interval: {}ms", config.scan_interval_ms);
    eprintln!(
        "  Batch: up to {} products x {} units",
        config.max_products_per_batch, config.max_quantity_per_product
    );
    eprintln!("  PO Item Scan Probability: {:.0}%", config.po_item_scan_probability * 100.0);
    eprintln!("  Expiry Window: {}-{} days", config.min_expiry_days, config.max_expiry_days);
    if config.monitoring_enabled {
        eprintln!("  Shelf Monitor: every {}ms", config.monitor_interval_ms);
    } else {
        eprintln!("  Shelf Monitor: disabled");
    }
    eprintln!("  Output Format: {}", config.output_format);
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}

fn print_purchase_orders(catalog: &Catalog) {
    println!("Purchase Orders:");
    for po in catalog.purchase_orders() {
        println!(
            "  {:<10} {:<11} {:<24} {:<18} {} lines, {} units",
            po.id,
            po.po_number,
            po.supplier_name,
            po.status,
            po.items.len(),
            po.total_expected_units()
        );
    }
}

fn print_reconciliation(snapshot: &SimulationSnapshot) {
    println!("Reconciliation ({}):", snapshot.purchase_order.as_deref().unwrap_or("no purchase order"));
    println!("  {:<36} {:>8} {:>8} {:>6}  {:<16} Expiry", "Product", "Expected", "Scanned", "Diff", "Status");
    for row in &snapshot.reconciliation {
        let expiry = row.simulated_expiry_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<36} {:>8} {:>8} {:>+6}  {:<16} {}",
            row.product_name,
            row.expected_quantity,
            row.scanned_quantity,
            row.discrepancy,
            row.status.to_string(),
            expiry
        );
    }
    println!();
}

fn print_alerts(snapshot: &SimulationSnapshot) {
    println!("Low Stock Alerts: {}", snapshot.alerts.low_stock.len());
    for product in &snapshot.alerts.low_stock {
        println!("  {} ({} left, reorder at {})", product.name, product.stock, product.reorder_level.unwrap_or(0));
    }
    println!("Misplaced Items: {}", snapshot.alerts.misplaced.len());
    for product in &snapshot.alerts.misplaced {
        println!(
            "  {} on {} (belongs on {})",
            product.name,
            product.current_shelf_location_id.as_ref().map(|s| s.as_str()).unwrap_or("N/A"),
            product.shelf_location_id.as_ref().map(|s| s.as_str()).unwrap_or("N/A")
        );
    }
    println!();
}

fn print_shipment_summary(summary: &ShipmentSummary) {
    println!("Shipment {} from {}:", summary.po_number, summary.supplier_name);
    println!(
        "  {} of {} expected units scanned",
        summary.total_scanned_units, summary.total_expected_units
    );
    for (status, count) in &summary.status_counts {
        println!("  {}: {}", status, count);
    }
    if summary.has_discrepancies {
        println!("  Finalized with quantity discrepancies");
    }
}
