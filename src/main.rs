use clap::Parser;
use pc_build_advisor::app::{run_check, run_recommend};
use pc_build_advisor::config::cli::{CliArgs, Command, LogFormat};
use pc_build_advisor::utils::error::{AdvisorError, ErrorSeverity};
use pc_build_advisor::utils::logger;

async fn execute(args: &CliArgs) -> Result<String, AdvisorError> {
    let config = args.load_config()?;
    match &args.command {
        Command::Recommend(recommend) => {
            let request = recommend.to_request()?;
            run_recommend(&config, recommend.catalog.as_deref(), &request)
                .await?
                .to_json()
        }
        Command::Check(check) => run_check(&config, check.catalog.as_deref(), &check.ids)
            .await?
            .to_json(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, matches!(args.log_format, LogFormat::Json));

    tracing::info!("🚀 Starting pc-build-advisor");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    match execute(&args).await {
        Ok(report) => {
            println!("{}", report);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

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
            Ok(())
        }
    }
}
