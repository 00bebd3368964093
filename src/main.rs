// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load a local .env (if any), parse arguments, set up logging
// 2. Fetch the friend-link list (the only step that can abort the run)
// 3. Probe every link: direct, then proxy, then the paced API queue
// 4. Write result.json and print a summary
// 5. Exit with proper code (0 = report written, 1 = error)
// =============================================================================

mod checker;       // src/checker/ - probing tiers, worker pool, API drain
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - runtime configuration
mod links;         // src/links/ - link records and list fetching
mod report;        // src/report.rs - result.json and console summary

use anyhow::Result;
use checker::Prober;
use clap::Parser;
use cli::Cli;
use config::Config;
use env_logger::Env;
use log::{error, info};
use report::Report;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // A missing .env file is the normal case on a server
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    if dotenv_loaded {
        info!("Loaded settings from .env");
    }

    let exit_code = match run(Cli::parse()).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let config = Arc::new(Config::from(cli));

    if config.api_key.is_none() {
        info!("No API key configured; links that fail direct and proxy access will be unreachable");
    }
    if config.proxy_url.is_none() {
        info!("No proxy configured; proxy tier will be skipped");
    }

    let prober = Prober::new(config.clone())?;

    // Failing here aborts before anything is written
    let fetch_client = reqwest::Client::builder().timeout(config.timeout).build()?;
    let records = links::fetch_link_list(&fetch_client, &config.source_url).await?;
    info!("Checking {} link(s) with {} workers", records.len(), config.concurrency);

    let results = checker::check_all(&prober, records).await;
    let report = Report::from_links(results);

    report.write_to(&config.output)?;
    report::print_report(&report, json)?;

    info!("Check finished, results saved to '{}'", config.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cli_for(source_url: &str, output: &Path) -> Cli {
        let output = output.to_string_lossy().to_string();
        Cli::try_parse_from([
            "friend-link-probe",
            "--source-url",
            source_url,
            "--output",
            output.as_str(),
            "--api-key",
            "",
            "--proxy-url",
            "",
            "--json",
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_list_fetch_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("result.json");

        assert!(run(cli_for(&server.uri(), &output)).await.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_single_reachable_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;
        let list = format!(
            r#"{{"link_list":[{{"name":"A","link":"{}/ok"}}]}}"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/flink.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(list))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("result.json");
        let source = format!("{}/flink.json", server.uri());

        run(cli_for(&source, &output)).await.unwrap();

        let report: Report =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(report.accessible_count, 1);
        assert_eq!(report.inaccessible_count, 0);
        assert_eq!(report.total_count, 1);
        let latency = f64::from(report.link_status[0].latency);
        assert!((0.5..1.0).contains(&latency), "latency was {}", latency);
    }

    #[tokio::test]
    async fn test_unreachable_link_without_proxy_or_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        let list = format!(
            r#"{{"link_list":[{{"name":"B","link":"{}/gone","avatar":"b.png"}}]}}"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/flink.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(list))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("result.json");
        let source = format!("{}/flink.json", server.uri());

        run(cli_for(&source, &output)).await.unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let report: Report = serde_json::from_str(&written).unwrap();
        assert_eq!(report.inaccessible_count, 1);
        assert_eq!(report.link_status[0].record.avatar, "b.png");
        assert!(written.contains("\"latency\": -1"));
    }
}
