use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use ticket_splitter::core::export::SplitPolicy;
use ticket_splitter::core::loader::get_filepath_by_type;
use ticket_splitter::core::ConfigProvider;
use ticket_splitter::utils::error::ErrorSeverity;
use ticket_splitter::utils::{logger, validation::Validate};
use ticket_splitter::{EtlEngine, LocalStorage, ReportPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Ticket comment report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the customer filter from config
    #[arg(long)]
    customer: Option<String>,

    /// Override the split count from config
    #[arg(long)]
    splits: Option<usize>,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show which files would be read and written without processing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_cli_logger(verbose);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 套用命令列覆蓋設定
    if let Some(customer) = args.customer {
        tracing::info!("🔧 Customer overridden to: '{}'", customer);
        config.filter.customer = customer;
    }
    if let Some(splits) = args.splits {
        tracing::info!("🔧 Splits overridden to: {}", splits);
        config.output.splits = splits;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, args.dry_run);

    if args.dry_run {
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let storage = LocalStorage::new(config.output_dir().to_string());
    let pipeline = ReportPipeline::new_with_monitoring(storage, config, monitor_enabled);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Report completed");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_dir());
    println!("  Output: {}", config.output_dir());
    if config.customer().is_empty() {
        println!("  Customer: (all)");
    } else {
        println!("  Customer: {}", config.customer());
    }
    println!("  Chunk size: {}", config.chunk_size());
    println!("  Format: {}", config.output_format());

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");

    let input_dir = Path::new(config.input_dir());
    let json_file = match config.json_file() {
        Some(path) => PathBuf::from(path),
        None => get_filepath_by_type(input_dir, "json", 0).context("No ticket export found")?,
    };
    let csv_file = match config.csv_file() {
        Some(path) => PathBuf::from(path),
        None => get_filepath_by_type(input_dir, "csv", 0).context("No customer lookup found")?,
    };
    println!("  🎫 Tickets: {}", json_file.display());
    println!("  👥 Lookup: {}", csv_file.display());

    println!();
    println!("💾 Output ({} will be cleared):", config.output_dir());
    let names = [config.threaded_name(), config.flattened_name()];
    match SplitPolicy::from_settings(config.splits(), config.max_split_bytes()) {
        SplitPolicy::Single => {
            for name in names {
                println!("  {}.{}", name, config.output_format());
            }
        }
        SplitPolicy::Even(n) => {
            for name in names {
                println!("  {}_split1.json .. {}_split{}.json", name, name, n);
            }
        }
        SplitPolicy::MaxBytes(bytes) => {
            for name in names {
                println!("  {}_split<i>.json, at most {} bytes each", name, bytes);
            }
        }
    }

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}
