use super::exit_codes;
use crate::cli::args::RunArgs;
use gavel_core::config::ProviderSettings;
use gavel_core::engine::BatchRunner;
use gavel_core::providers::llm::openai::OpenAiClient;
use gavel_core::report;
use std::sync::Arc;

/// The batch trigger. Input validation and credential resolution happen
/// before any store access; per-assignment failures surface only inside the
/// results array, never as a run failure.
pub async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    if args.user.trim().is_empty() {
        eprintln!("config error: --user must not be empty");
        return Ok(exit_codes::CONFIG_ERROR);
    }
    if args.format != "text" && args.format != "json" {
        eprintln!("config error: --format must be text or json");
        return Ok(exit_codes::CONFIG_ERROR);
    }

    let settings = match ProviderSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let store = super::open_store(&args.db)?;
    let client = OpenAiClient::with_base_url(settings.api_key, settings.base_url);
    let runner = BatchRunner::new(store, Arc::new(client));

    match runner.run_workspace(args.workspace, &args.user).await {
        Ok(summary) => {
            if args.format == "json" {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                report::console::print_summary(&summary);
            }
            Ok(exit_codes::OK)
        }
        Err(e) => {
            let message = format!("{:#}", e);
            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "error": message }))?
                );
            }
            eprintln!("run failed: {}", message);
            Ok(exit_codes::RUN_FAILED)
        }
    }
}
