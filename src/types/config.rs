//! Configuration structures for the kiosk inventory simulator
//!
//! This module contains the simulation configuration structure and validation logic
//! used to control the stock-in scanner, the shelf monitor, and the headless run.

use super::OutputFormat;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reference timings and limits of the stock-in scanner
pub mod scan_defaults {
    /// Period of the scan generator in milliseconds
    pub const SCAN_INTERVAL_MS: u64 = 4000;

    /// Maximum number of distinct products per scan batch
    pub const MAX_PRODUCTS_PER_BATCH: usize = 3;

    /// Maximum quantity seen for one product in one batch
    pub const MAX_QUANTITY_PER_PRODUCT: u32 = 5;

    /// Lower bound for simulated expiry dates, in days from today
    pub const MIN_EXPIRY_DAYS: u32 = 30;

    /// Upper bound for simulated expiry dates, in days from today
    pub const MAX_EXPIRY_DAYS: u32 = 365;

    /// Probability that a scan picks an item listed on the purchase order
    pub const PO_ITEM_SCAN_PROBABILITY: f64 = 0.85;

    /// Probability of preferring an under-scanned purchase order item
    pub const UNSCANNED_ITEM_PRIORITY: f64 = 0.7;

    /// Lower bound of the per-item processing stagger
    pub const MIN_ITEM_DELAY_MS: u64 = 100;

    /// Upper bound of the per-item processing stagger
    pub const MAX_ITEM_DELAY_MS: u64 = 400;
}

/// Reference timings and probabilities of the shelf monitor
pub mod monitor_defaults {
    /// Period of the shelf monitor in milliseconds
    pub const MONITOR_INTERVAL_MS: u64 = 5000;

    /// Probability that the sampled product loses stock on a tick
    pub const STOCK_DECAY_PROBABILITY: f64 = 0.3;

    /// Largest stock decrease applied in one tick
    pub const MAX_STOCK_DECREASE: u32 = 3;

    /// Probability that a product is moved to another shelf on a tick
    pub const MISPLACEMENT_PROBABILITY: f64 = 0.15;
}

/// Upper bounds accepted by validation
pub mod limits {
    /// Longest timer period or item stagger: one day
    pub const MAX_INTERVAL_MS: u64 = 86_400_000;

    /// Longest simulated run: one year
    pub const MAX_DURATION_SECS: u64 = 31_536_000;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kiosk-inventory-sim",
    version = "0.1.0",
    about = "Kiosk Inventory Simulator - vision stock-in reconciliation and shelf monitoring",
    long_about = "Runs the kiosk's vision stock-in scanner and shelf monitor headlessly over virtual time, reconciling scanned quantities against a purchase order and raising low-stock and misplaced-item alerts.

EXAMPLES:
    # Run with default settings (first purchase order, 60 simulated seconds)
    kiosk-inventory-sim

    # Receive a specific purchase order for five simulated minutes
    kiosk-inventory-sim --purchase-order PO2024002 --duration-secs 300

    # Reproducible run with JSON output
    kiosk-inventory-sim --seed 42 --output-format json

    # Generate configuration template
    kiosk-inventory-sim --print-config > my-config.json

    # Validate configuration without running
    kiosk-inventory-sim --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Purchase order to receive
    #[arg(
        long,
        help = "Purchase order id to receive",
        long_help = "Identifier of the purchase order to select before scanning, e.g. PO2024001. Default: the first purchase order in the catalog"
    )]
    pub purchase_order: Option<String>,

    /// Simulated run length in seconds
    #[arg(long, help = "Simulated run length in seconds")]
    pub duration_secs: Option<u64>,

    /// Scan generator period in milliseconds
    #[arg(long, help = "Scan generator period in milliseconds")]
    pub scan_interval_ms: Option<u64>,

    /// Maximum distinct products per scan batch
    #[arg(long, help = "Maximum distinct products per scan batch")]
    pub max_products_per_batch: Option<usize>,

    /// Maximum quantity per product per batch
    #[arg(long, help = "Maximum quantity per product per batch")]
    pub max_quantity_per_product: Option<u32>,

    /// Probability of scanning a purchase order item (0.0-1.0)
    #[arg(long, help = "Probability of scanning a purchase order item (0.0-1.0)")]
    pub po_item_scan_probability: Option<f64>,

    /// Probability of preferring under-scanned items (0.0-1.0)
    #[arg(long, help = "Probability of preferring under-scanned items (0.0-1.0)")]
    pub unscanned_item_priority: Option<f64>,

    /// Shelf monitor period in milliseconds
    #[arg(long, help = "Shelf monitor period in milliseconds")]
    pub monitor_interval_ms: Option<u64>,

    /// Probability of a stock decrease per monitor tick (0.0-1.0)
    #[arg(long, help = "Probability of a stock decrease per monitor tick (0.0-1.0)")]
    pub stock_decay_probability: Option<f64>,

    /// Probability of a misplacement per monitor tick (0.0-1.0)
    #[arg(long, help = "Probability of a misplacement per monitor tick (0.0-1.0)")]
    pub misplacement_probability: Option<f64>,

    /// Disable the shelf monitor for this run
    #[arg(long, help = "Disable the shelf monitor")]
    pub no_monitoring: bool,

    /// Output format for the final report
    #[arg(
        long,
        help = "Output format (text or json)",
        long_help = "Output format for the end-of-run report. Supported formats: text, json. Default: text"
    )]
    pub output_format: Option<String>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Path for the JSONL kiosk event log
    #[arg(long, help = "Write kiosk monitoring events to this JSONL file")]
    pub event_log_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,

    /// List the purchase orders of the reference catalog and exit
    #[arg(long, help = "List available purchase orders and exit")]
    pub list_purchase_orders: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Scan generator period in milliseconds
    pub scan_interval_ms: Option<u64>,
    /// Maximum distinct products per scan batch
    pub max_products_per_batch: Option<usize>,
    /// Maximum quantity per product per batch
    pub max_quantity_per_product: Option<u32>,
    /// Lower bound for simulated expiry dates in days
    pub min_expiry_days: Option<u32>,
    /// Upper bound for simulated expiry dates in days
    pub max_expiry_days: Option<u32>,
    /// Probability of scanning a purchase order item
    pub po_item_scan_probability: Option<f64>,
    /// Probability of preferring under-scanned items
    pub unscanned_item_priority: Option<f64>,
    /// Lower bound of the per-item processing stagger
    pub min_item_delay_ms: Option<u64>,
    /// Upper bound of the per-item processing stagger
    pub max_item_delay_ms: Option<u64>,
    /// Shelf monitor period in milliseconds
    pub monitor_interval_ms: Option<u64>,
    /// Probability of a stock decrease per monitor tick
    pub stock_decay_probability: Option<f64>,
    /// Largest stock decrease per tick
    pub max_stock_decrease: Option<u32>,
    /// Probability of a misplacement per monitor tick
    pub misplacement_probability: Option<f64>,
    /// Purchase order to receive
    pub purchase_order: Option<String>,
    /// Simulated run length in seconds
    pub duration_secs: Option<u64>,
    /// Whether the shelf monitor runs
    pub monitoring_enabled: Option<bool>,
    /// Output format for the final report
    pub output_format: Option<String>,
    /// Random seed for reproducible results
    pub seed: Option<u64>,
    /// Path for the JSONL kiosk event log
    pub event_log_output: Option<String>,
}

/// Configuration for the kiosk simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    // Stock-in scanner
    /// Scan generator period in milliseconds
    pub scan_interval_ms: u64,
    /// Maximum distinct products per scan batch
    pub max_products_per_batch: usize,
    /// Maximum quantity per product per batch
    pub max_quantity_per_product: u32,
    /// Lower bound for simulated expiry dates in days
    pub min_expiry_days: u32,
    /// Upper bound for simulated expiry dates in days
    pub max_expiry_days: u32,
    /// Probability of scanning a purchase order item (0.0-1.0)
    pub po_item_scan_probability: f64,
    /// Probability of preferring under-scanned items (0.0-1.0)
    pub unscanned_item_priority: f64,
    /// Lower bound of the per-item processing stagger
    pub min_item_delay_ms: u64,
    /// Upper bound of the per-item processing stagger
    pub max_item_delay_ms: u64,

    // Shelf monitor
    /// Shelf monitor period in milliseconds
    pub monitor_interval_ms: u64,
    /// Probability of a stock decrease per monitor tick (0.0-1.0)
    pub stock_decay_probability: f64,
    /// Largest stock decrease per tick
    pub max_stock_decrease: u32,
    /// Probability of a misplacement per monitor tick (0.0-1.0)
    pub misplacement_probability: f64,

    // Headless run
    /// Purchase order to receive; the first catalog order when unset
    pub purchase_order: Option<String>,
    /// Simulated run length in seconds
    pub duration_secs: u64,
    /// Whether the shelf monitor runs
    pub monitoring_enabled: bool,
    /// Output format for the final report
    pub output_format: String,
    /// Random seed for reproducible results
    pub seed: Option<u64>,
    /// Path for the JSONL kiosk event log
    pub event_log_output: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// A timer period is zero
    #[error("Interval {field} must be greater than 0")]
    InvalidInterval {
        /// Name of the offending field
        field: String,
    },

    /// A timer period or stagger is longer than the simulator supports
    #[error("Interval {field} is {value} ms, more than the {max} ms limit")]
    IntervalTooLong {
        /// Name of the offending field
        field: String,
        /// The configured value
        value: u64,
        /// Largest accepted value
        max: u64,
    },

    /// Batch size is invalid
    #[error("Max products per batch must be greater than 0, got {0}")]
    InvalidBatchSize(usize),

    /// Quantity bound is invalid
    #[error("Max quantity per product must be greater than 0, got {0}")]
    InvalidQuantity(u32),

    /// Stock decrease bound is invalid
    #[error("Max stock decrease must be greater than 0, got {0}")]
    InvalidStockDecrease(u32),

    /// Expiry range is invalid
    #[error("Invalid expiry range: min ({0}) must be <= max ({1})")]
    InvalidExpiryRange(u32, u32),

    /// Processing delay range is invalid
    #[error("Invalid item delay range: min ({0}) must be <= max ({1})")]
    InvalidDelayRange(u64, u64),

    /// Run duration is invalid
    #[error("Duration must be greater than 0 seconds, got {0}")]
    InvalidDuration(u64),

    /// Run duration is longer than the simulator supports
    #[error("Duration must be at most {max} seconds, got {value}")]
    DurationTooLong {
        /// The configured value
        value: u64,
        /// Largest accepted value
        max: u64,
    },

    /// Output format is unknown
    #[error("Unknown output format: {0}")]
    InvalidOutputFormat(String),

    /// Probability value is out of range
    #[error("Invalid probability for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidPercentage {
        /// Name of the field with invalid probability
        field: String,
        /// The invalid probability value
        value: f64,
    },
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: scan_defaults::SCAN_INTERVAL_MS,
            max_products_per_batch: scan_defaults::MAX_PRODUCTS_PER_BATCH,
            max_quantity_per_product: scan_defaults::MAX_QUANTITY_PER_PRODUCT,
            min_expiry_days: scan_defaults::MIN_EXPIRY_DAYS,
            max_expiry_days: scan_defaults::MAX_EXPIRY_DAYS,
            po_item_scan_probability: scan_defaults::PO_ITEM_SCAN_PROBABILITY,
            unscanned_item_priority: scan_defaults::UNSCANNED_ITEM_PRIORITY,
            min_item_delay_ms: scan_defaults::MIN_ITEM_DELAY_MS,
            max_item_delay_ms: scan_defaults::MAX_ITEM_DELAY_MS,
            monitor_interval_ms: monitor_defaults::MONITOR_INTERVAL_MS,
            stock_decay_probability: monitor_defaults::STOCK_DECAY_PROBABILITY,
            max_stock_decrease: monitor_defaults::MAX_STOCK_DECREASE,
            misplacement_probability: monitor_defaults::MISPLACEMENT_PROBABILITY,
            purchase_order: None,
            duration_secs: 60,
            monitoring_enabled: true,
            output_format: "text".to_string(),
            seed: None,
            event_log_output: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            scan_interval_ms: file.scan_interval_ms.unwrap_or(defaults.scan_interval_ms),
            max_products_per_batch: file
                .max_products_per_batch
                .unwrap_or(defaults.max_products_per_batch),
            max_quantity_per_product: file
                .max_quantity_per_product
                .unwrap_or(defaults.max_quantity_per_product),
            min_expiry_days: file.min_expiry_days.unwrap_or(defaults.min_expiry_days),
            max_expiry_days: file.max_expiry_days.unwrap_or(defaults.max_expiry_days),
            po_item_scan_probability: file
                .po_item_scan_probability
                .unwrap_or(defaults.po_item_scan_probability),
            unscanned_item_priority: file
                .unscanned_item_priority
                .unwrap_or(defaults.unscanned_item_priority),
            min_item_delay_ms: file.min_item_delay_ms.unwrap_or(defaults.min_item_delay_ms),
            max_item_delay_ms: file.max_item_delay_ms.unwrap_or(defaults.max_item_delay_ms),
            monitor_interval_ms: file.monitor_interval_ms.unwrap_or(defaults.monitor_interval_ms),
            stock_decay_probability: file
                .stock_decay_probability
                .unwrap_or(defaults.stock_decay_probability),
            max_stock_decrease: file.max_stock_decrease.unwrap_or(defaults.max_stock_decrease),
            misplacement_probability: file
                .misplacement_probability
                .unwrap_or(defaults.misplacement_probability),
            purchase_order: file.purchase_order.or(defaults.purchase_order),
            duration_secs: file.duration_secs.unwrap_or(defaults.duration_secs),
            monitoring_enabled: file.monitoring_enabled.unwrap_or(defaults.monitoring_enabled),
            output_format: file.output_format.unwrap_or(defaults.output_format),
            seed: file.seed.or(defaults.seed),
            event_log_output: file.event_log_output.or(defaults.event_log_output),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.purchase_order {
            config.purchase_order = Some(value);
        }
        if let Some(value) = args.duration_secs {
            config.duration_secs = value;
        }
        if let Some(value) = args.scan_interval_ms {
            config.scan_interval_ms = value;
        }
        if let Some(value) = args.max_products_per_batch {
            config.max_products_per_batch = value;
        }
        if let Some(value) = args.max_quantity_per_product {
            config.max_quantity_per_product = value;
        }
        if let Some(value) = args.po_item_scan_probability {
            config.po_item_scan_probability = value;
        }
        if let Some(value) = args.unscanned_item_priority {
            config.unscanned_item_priority = value;
        }
        if let Some(value) = args.monitor_interval_ms {
            config.monitor_interval_ms = value;
        }
        if let Some(value) = args.stock_decay_probability {
            config.stock_decay_probability = value;
        }
        if let Some(value) = args.misplacement_probability {
            config.misplacement_probability = value;
        }
        if args.no_monitoring {
            config.monitoring_enabled = false;
        }
        if let Some(value) = args.output_format {
            config.output_format = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.event_log_output {
            config.event_log_output = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        Self::validate_interval("scan_interval_ms", self.scan_interval_ms)?;
        Self::validate_interval("monitor_interval_ms", self.monitor_interval_ms)?;

        if self.max_products_per_batch == 0 {
            return Err(ConfigValidationError::InvalidBatchSize(self.max_products_per_batch));
        }
        if self.max_quantity_per_product == 0 {
            return Err(ConfigValidationError::InvalidQuantity(self.max_quantity_per_product));
        }
        if self.max_stock_decrease == 0 {
            return Err(ConfigValidationError::InvalidStockDecrease(self.max_stock_decrease));
        }
        if self.min_expiry_days > self.max_expiry_days {
            return Err(ConfigValidationError::InvalidExpiryRange(
                self.min_expiry_days,
                self.max_expiry_days,
            ));
        }
        if self.min_item_delay_ms > self.max_item_delay_ms {
            return Err(ConfigValidationError::InvalidDelayRange(
                self.min_item_delay_ms,
                self.max_item_delay_ms,
            ));
        }
        if self.max_item_delay_ms > limits::MAX_INTERVAL_MS {
            return Err(ConfigValidationError::IntervalTooLong {
                field: "max_item_delay_ms".to_string(),
                value: self.max_item_delay_ms,
                max: limits::MAX_INTERVAL_MS,
            });
        }
        if self.duration_secs == 0 {
            return Err(ConfigValidationError::InvalidDuration(self.duration_secs));
        }
        if self.duration_secs > limits::MAX_DURATION_SECS {
            return Err(ConfigValidationError::DurationTooLong {
                value: self.duration_secs,
                max: limits::MAX_DURATION_SECS,
            });
        }

        self.validate_percentage("po_item_scan_probability", self.po_item_scan_probability)?;
        self.validate_percentage("unscanned_item_priority", self.unscanned_item_priority)?;
        self.validate_percentage("stock_decay_probability", self.stock_decay_probability)?;
        self.validate_percentage("misplacement_probability", self.misplacement_probability)?;

        if self.get_output_format().is_err() {
            return Err(ConfigValidationError::InvalidOutputFormat(self.output_format.clone()));
        }

        Ok(())
    }

    fn validate_interval(field: &str, value: u64) -> Result<(), ConfigValidationError> {
        if value == 0 {
            return Err(ConfigValidationError::InvalidInterval { field: field.to_string() });
        }
        if value > limits::MAX_INTERVAL_MS {
            return Err(ConfigValidationError::IntervalTooLong {
                field: field.to_string(),
                value,
                max: limits::MAX_INTERVAL_MS,
            });
        }
        Ok(())
    }

    /// Helper method to validate probability values
    fn validate_percentage(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigValidationError::InvalidPercentage {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Get the expiry window as a tuple of days
    pub fn expiry_window_days(&self) -> (u32, u32) {
        (self.min_expiry_days, self.max_expiry_days)
    }

    /// Get the item processing stagger as a tuple of milliseconds
    pub fn item_delay_range_ms(&self) -> (u64, u64) {
        (self.min_item_delay_ms, self.max_item_delay_ms)
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }
}
