use clap::Parser;
use ecommerce_dashboard::core::{ConfigProvider, Storage};
use ecommerce_dashboard::utils::error::{DashboardError, ErrorSeverity};
use ecommerce_dashboard::utils::{logger, validation::Validate};
use ecommerce_dashboard::{CliConfig, DashboardEngine, DashboardPipeline, Dataset, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting ecommerce-dashboard CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.output_path.clone());

    if config.list_filters {
        if let Err(e) = list_filters(&storage, &config).await {
            exit_with(e);
        }
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建管道與引擎並運行
    let pipeline = DashboardPipeline::new(storage, config);
    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard build completed successfully!");
            println!("✅ Dashboard build completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

/// 印出側邊欄可選的篩選值
async fn list_filters(storage: &LocalStorage, config: &CliConfig) -> Result<(), DashboardError> {
    let data = storage.read_file(config.data_file()).await?;
    let dataset = Dataset::from_csv_bytes(&data)?;
    let options = dataset.filter_options()?;

    println!("📅 Date range: {} → {}", options.min_date.date(), options.max_date.date());
    println!("🏙️ Cities ({}):", options.cities.len());
    for city in options.city_choices() {
        println!("  {}", city);
    }
    println!("🗺️ States ({}):", options.states.len());
    for state in options.state_choices() {
        println!("  {}", state);
    }

    Ok(())
}

fn exit_with(e: DashboardError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
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
