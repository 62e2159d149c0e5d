use anyhow::Context;
use clap::Parser;
use seo_content_gen::adapters::clipboard;
use seo_content_gen::core::export::export_markdown;
use seo_content_gen::domain::publish::PUBLISH_TARGETS;
use seo_content_gen::utils::error::ErrorSeverity;
use seo_content_gen::utils::{logger, validation::Validate};
use seo_content_gen::{
    CliArgs, GeminiClient, GenerationEngine, GenerationReport, GenerationSession, LocalStorage,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting seo-content-gen");

    let config = args.load_config().with_context(|| match &args.config {
        Some(path) => format!("Failed to load config file '{}'", path),
        None => "Failed to build default configuration".to_string(),
    })?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let request = args.request();
    let client = Arc::new(GeminiClient::from_config(&config)?);
    let session = GenerationSession::with_config(client, request.clone(), &config);
    let engine = GenerationEngine::new(session);

    let report = match engine.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("❌ Generation failed: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 4,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    print_report(&report);

    if let Some(output_path) = &config.output.output_path {
        let storage = LocalStorage::new(output_path);
        let file_name = export_markdown(&storage, &request, &report.keywords, &report.post)
            .await
            .with_context(|| format!("Failed to write post to '{}'", output_path))?;
        println!("📁 Saved to {}", storage.base_path().join(file_name).display());
    }

    if config.output.copy_to_clipboard {
        if clipboard::copy_text(&report.post.to_plain_text()) {
            println!("📋 Copied to clipboard");
        } else {
            println!("📋 Clipboard unavailable; copy the text above manually");
        }
    }

    println!();
    println!("Publish on:");
    for target in PUBLISH_TARGETS {
        println!("  {:<10} {}", target.name, target.url);
    }

    Ok(())
}

fn print_report(report: &GenerationReport) {
    println!("🔑 Keywords:");
    for keyword in &report.keywords {
        println!("  - {}", keyword);
    }
    println!();
    println!("# {}", report.post.title);
    for paragraph in report.post.paragraphs() {
        println!();
        println!("{}", paragraph.trim());
    }
}
