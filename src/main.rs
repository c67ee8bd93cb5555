use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, WrapErr, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, Command, OutputFormat};
use ytdigest::config::{self, ApiKeys, Config, Settings};
use ytdigest::pipeline::{AnalysisResponse, Analyzer, LogObserver};

fn setup_logging(to_stderr: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    if to_stderr {
        builder.target(env_logger::Target::Stderr).init();
        return Ok(());
    }

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytdigest.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytdigest")
        .join("logs")
}

/// Non-zero exit for a request that did not succeed; the rendered output is already printed
fn check_success(response: &AnalysisResponse) -> Result<()> {
    if !response.success {
        bail!(
            "analysis failed ({})",
            response.code.as_deref().unwrap_or("UNKNOWN_ERROR")
        );
    }
    Ok(())
}

fn key_line(name: &str, present: bool) -> String {
    if present {
        format!("  \x1b[32m✅\x1b[0m {name}")
    } else {
        format!("  \x1b[31m❌\x1b[0m {name}     (not set)")
    }
}

fn build_after_help() -> String {
    let keys = ApiKeys::from_env();
    let log_path = log_dir().join("ytdigest.log");

    format!(
        "\nREQUIRED ENVIRONMENT:\n{}\n{}\n\nConfig file: {}\nLogs are written to: {}",
        key_line(config::SUPADATA_KEY_VAR, keys.supadata.is_some()),
        key_line(config::OPENAI_KEY_VAR, keys.openai.is_some()),
        config::config_path().display(),
        log_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    setup_logging(cli.log_stderr)?;

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let config = Config::load_from(&config_path)
        .wrap_err_with(|| format!("failed to load config from {}", config_path.display()))?;

    let settings = Settings::resolve(&config, ApiKeys::from_env(), cli.model.clone());
    debug!(
        "Settings: model={} supadata={} openai={} oembed={}",
        settings.model, settings.supadata_url, settings.openai_url, settings.oembed_url
    );

    if cli.verbose {
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Model: {}", settings.model);
    }

    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .wrap_err("failed to build HTTP client")?;

    let analyzer = Arc::new(Analyzer::new(settings, client, Arc::new(LogObserver)));

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind
                .or(config.bind)
                .unwrap_or_else(|| config::DEFAULT_BIND.to_string());
            if cli.verbose {
                eprintln!("Listening on {bind}");
            }
            ytdigest::server::serve(analyzer, &bind).await?;
        }
        Command::Analyze { url, format } => {
            let response = analyzer.run(url).await;
            let rendered = match format {
                OutputFormat::Text => ytdigest::output::render_text(&response),
                OutputFormat::Json => ytdigest::output::render_json(&response),
            };
            println!("{rendered}");
            check_success(&response)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use ytdigest::error::AnalyzeError;

    #[test]
    fn test_check_success_fails_on_rejected_request() {
        let err = AnalyzeError::InvalidUrl("nope".to_string());
        let response = AnalysisResponse::from_error(&err, "req", Duration::ZERO);
        let report = check_success(&response).unwrap_err();
        assert_eq!(report.to_string(), "analysis failed (INVALID_URL)");
    }
}
