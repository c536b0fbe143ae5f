use clap::Parser;
use ecommerce_dashboard::config::toml_config::TomlConfig;
use ecommerce_dashboard::core::{ConfigProvider, Pipeline};
use ecommerce_dashboard::report::render_outputs;
use ecommerce_dashboard::utils::error::ErrorSeverity;
use ecommerce_dashboard::utils::{logger, validation::Validate};
use ecommerce_dashboard::{DashboardEngine, DashboardPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-dashboard")]
#[command(about = "Dashboard reports driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - load the data and show what would be written
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based dashboard");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    let storage = LocalStorage::new(config.output_path().to_string());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - Nothing will be written");
        let pipeline = DashboardPipeline::new(storage, config);
        perform_dry_run(&pipeline).await?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = DashboardPipeline::new(storage, config);
    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard build completed successfully!");
            println!("✅ Dashboard build completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Dashboard: {} v{}",
        config.dashboard.name,
        config.dashboard.version.as_deref().unwrap_or("-")
    );
    if let Some(description) = &config.dashboard.description {
        println!("  Description: {}", description);
    }
    println!("  Data file: {}", config.data_file());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output.formats.join(", "));

    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(
    pipeline: &DashboardPipeline<LocalStorage, TomlConfig>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = pipeline.config();

    println!("🔍 Dry Run Analysis:");
    println!();

    let dataset = pipeline.extract().await?;
    let options = dataset.filter_options()?;

    println!("📥 Data Source:");
    println!("  File: {}", config.data_file());
    println!("  Rows: {}", dataset.len());
    println!(
        "  Purchase dates: {} → {}",
        options.min_date.date(),
        options.max_date.date()
    );
    println!("  Cities: {}", options.cities.len());
    println!("  States: {}", options.states.len());

    let selection = config.selection()?;
    println!();
    println!("🎯 Selection:");
    match selection.date_range {
        Some(range) => println!("  Date range: {}", range),
        None => println!("  Date range: full dataset"),
    }
    println!("  City: {}", selection.city);
    println!("  State: {}", selection.state);
    if let Some(types) = &selection.payment_types {
        println!("  Payment types: {}", types.join(", "));
    }
    if let Some(segments) = &selection.customer_segments {
        println!("  Customer segments: {}", segments.join(", "));
    }

    let output = pipeline.transform(dataset).await?;
    println!(
        "  Rows selected: {} of {} in date range",
        output.selection.rows_selected, output.selection.rows_in_date_range
    );

    let output_options = config.output_options()?;
    let files = render_outputs(&output, &output_options)?;

    println!();
    println!("💾 Planned Output:");
    println!("  Path: {}", config.output_path());
    match &output_options.archive_name {
        Some(archive) => println!("  Archive: {} ({} files)", archive, files.len()),
        None => println!("  Files: {}", files.len()),
    }
    for file in &files {
        println!("    {} ({} bytes)", file.path, file.data.len());
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
