use anyhow::{Result, anyhow};
use serde_json::json;
use std::io::Write;

use ads_connect::auth::authorization_url;
use ads_connect::cli::build_cli;
use ads_connect::config::Config;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();

    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("debug"));

    let config = Config::from_matches(&matches)?;

    if matches.subcommand_matches("serve").is_some() {
        return ads_connect::app::serve(config).await;
    }

    if let Some(matches) = matches.subcommand_matches("auth-url") {
        let url = authorization_url(&config.oauth)?;
        if matches.get_flag("json") {
            return write_stdout_line(&serde_json::to_string(&json!({ "url": url }))?);
        }
        return write_stdout_line(&url);
    }

    Err(anyhow!("command required"))
}

fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_env("RUST_LOG")
        .filter_level(level)
        .init();
}

fn write_stdout_line(line: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(line.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
