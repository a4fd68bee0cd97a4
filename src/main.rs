use anyhow::Context;
use clap::Parser;
use reddit_comment_exporter::bootstrap::runner::SystemRunner;
use reddit_comment_exporter::config::cli::prompt_thread_url;
use reddit_comment_exporter::config::toml_config::TomlConfig;
use reddit_comment_exporter::config::{Command, ExportArgs, SetupArgs};
use reddit_comment_exporter::utils::{logger, validation::Validate};
use reddit_comment_exporter::{
    BootstrapConfig, Bootstrapper, CliConfig, ExportEngine, ExportSettings, ExporterError,
    LocalStorage, ThreadPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting reddit-comment-exporter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let file_config = match TomlConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Export(ExportArgs::default()));

    let exit_code = match command {
        Command::Export(args) => run_export(&args, &file_config).await?,
        Command::Setup(args) => run_setup(&args, &file_config),
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn run_export(args: &ExportArgs, file_config: &TomlConfig) -> anyhow::Result<i32> {
    let merged = args.apply(file_config);
    if let Err(e) = merged.validate() {
        return Ok(report_failure("Configuration validation failed", &e));
    }

    let mut settings = ExportSettings::from_toml(&merged, args.url.clone().unwrap_or_default());

    let storage = LocalStorage::new(settings.output_dir.clone());
    match storage.ensure_base_dir() {
        Ok(true) => println!("Created output directory: {}", storage.base_path()),
        Ok(false) => {}
        Err(e) => return Ok(report_failure("Cannot create output directory", &e)),
    }

    if settings.thread_url.is_empty() {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        settings.thread_url = prompt_thread_url(&mut stdin.lock(), &mut stdout.lock())
            .context("failed to read the thread URL")?;
    }

    if let Err(e) = settings.validate() {
        return Ok(report_failure("Configuration validation failed", &e));
    }

    let pipeline = match ThreadPipeline::new(storage, settings) {
        Ok(pipeline) => pipeline,
        Err(e) => return Ok(report_failure("Cannot build HTTP client", &e)),
    };
    let engine = ExportEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Export completed: {}", summary.path);
            println!("Comments exported to {}", summary.path);
            println!(
                "Processed {} top-level comments and {} total comments.",
                summary.top_level_count, summary.total_count
            );
            Ok(0)
        }
        Err(e) => Ok(report_failure("Export failed", &e)),
    }
}

fn run_setup(args: &SetupArgs, file_config: &TomlConfig) -> i32 {
    let config = BootstrapConfig::from(&args.apply(file_config));

    let bootstrapper = match Bootstrapper::new(config, SystemRunner) {
        Ok(bootstrapper) => bootstrapper,
        Err(e) => return report_failure("Setup cannot start", &e),
    };
    if let Err(e) = bootstrapper.enter() {
        return report_failure("Setup cannot start", &e);
    }
    tracing::info!("Working in {}", bootstrapper.root().display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match bootstrapper.run(&mut out) {
        Ok(report) => {
            if !report.succeeded() {
                tracing::warn!("Setup finished with failed steps: {:?}", report.outcomes);
            }
            report.exit_code()
        }
        Err(ExporterError::StepFailedError { step, code }) => {
            tracing::error!("❌ Setup stopped at '{}' (exit code {})", step, code);
            eprintln!("❌ Setup stopped: '{}' failed with exit code {}", step, code);
            eprintln!("💡 Re-run with --keep-going to attempt the remaining steps anyway");
            code
        }
        Err(e) => report_failure("Setup failed", &e),
    }
}

fn report_failure(context: &str, e: &ExporterError) -> i32 {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    e.severity().exit_code()
}
