use anyhow::Context;
use clap::Parser;
use serp_rank::adapters::workbook::OutputColumns;
use serp_rank::domain::model::KeywordRow;
use serp_rank::utils::{logger, validation::Validate};
use serp_rank::{
    load_keywords, CliArgs, ExcelRankWriter, RankError, RankTracker, SerpApiClient, SheetLayout,
    TrackerConfig,
};
use std::path::Path;
use std::sync::Arc;

/// Ctrl-C 中斷時的退出碼
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting serp-rank");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TrackerConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let layout = SheetLayout::from(&config.spreadsheet);
    let excel_path = Path::new(&config.spreadsheet.path);

    let mut rows = match load_keywords(excel_path, &layout) {
        Ok(rows) => rows,
        Err(e) => fail(&e),
    };
    if let Some(max) = config.max_keywords {
        rows.truncate(max);
    }

    let writer = ExcelRankWriter::new(excel_path, layout);
    let columns = match writer.check_columns() {
        Ok(columns) => Some(columns),
        Err(e) => {
            tracing::warn!("⚠ {} - rows will be skipped when writing", e);
            None
        }
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No searches or writes will occur");
        perform_dry_run(&config, &rows, columns);
        return Ok(());
    }

    println!("✓ Found {} keywords to process", rows.len());
    println!(
        "→ Updating {} in-place (format preserved)",
        writer.path().display()
    );

    let client = SerpApiClient::new(&config.search).context("failed to build SerpAPI client")?;
    let tracker = RankTracker::from_config(Arc::new(client), writer, &config);

    tokio::select! {
        summary = tracker.run(&rows) => {
            tracing::info!(
                "📊 Processed {} keywords: {} saved, {} failed writes, {} local hits, {} organic hits",
                summary.processed,
                summary.written,
                summary.write_failures,
                summary.local_found,
                summary.organic_found
            );
            println!("✅ All keywords processed!");
            println!("📁 Results saved to: {}", config.spreadsheet.path);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("⚠ Process interrupted by user");
            eprintln!("⚠ Process interrupted by user");
            eprintln!("✓ Progress saved to {}", config.spreadsheet.path);
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }

    Ok(())
}

fn fail(e: &RankError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}

fn display_config_summary(config: &TrackerConfig, args: &CliArgs) {
    println!("📋 Configuration Summary:");
    println!("  Target Domain: {}", config.target.domain);
    println!("  Location: {}", config.search.location);
    println!(
        "  Excel File: {} [{}]",
        config.spreadsheet.path, config.spreadsheet.sheet
    );
    println!(
        "  Pages: {} x {} results",
        config.search.max_pages(),
        config.search.results_per_page()
    );

    if let Some(max) = config.max_keywords {
        println!("  Max Keywords: {}", max);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TrackerConfig, rows: &[KeywordRow], columns: Option<OutputColumns>) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📊 Output Columns:");
    match columns {
        Some(columns) => {
            println!(
                "  {} -> column {}",
                config.spreadsheet.local_column, columns.local
            );
            println!(
                "  {} -> column {}",
                config.spreadsheet.organic_column, columns.organic
            );
        }
        None => println!("  ⚠ Output columns could not be resolved"),
    }

    println!();
    println!("📝 Keywords ({}):", rows.len());
    for row in rows {
        println!(
            "  row {:>4}: {}",
            serp_rank::excel_row(config.spreadsheet.header_row, row.row_index),
            row.keyword
        );
    }

    let queries_per_keyword = 1 + config.search.max_pages();
    println!();
    println!(
        "📡 Up to {} API searches ({} per keyword)",
        rows.len() as u64 * queries_per_keyword as u64,
        queries_per_keyword
    );
    println!();
    println!("✅ Dry run analysis complete.");
}
