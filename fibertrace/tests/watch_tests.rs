// Tests for the watch loop against a live HTTP topology source

use clap::{ArgMatches, Command, arg};
use fibertrace::config::{CliOverrides, Config, Settings};
use fibertrace::handlers::handle_watch;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NETWORKS: &str = include_str!("../../fibertrace-core/tests/fixtures/networks.json");

fn watch_args(argv: &[&str]) -> ArgMatches {
    Command::new("watch")
        .arg(arg!(-i --"interval" <SECS>).value_parser(clap::value_parser!(u64)))
        .arg(arg!(--"count" <RELOADS>).value_parser(clap::value_parser!(u64)))
        .arg(arg!([TARGET]))
        .get_matches_from(std::iter::once("watch").chain(argv.iter().copied()))
}

fn settings_for(server: &MockServer) -> Settings {
    Settings::resolve(
        CliOverrides {
            source: Some(format!("{}/networks.json", server.uri())),
            ..CliOverrides::default()
        },
        Config::default(),
    )
}

fn topology() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(NETWORKS)
}

async fn run_watch(server: &MockServer, argv: &[&str]) -> anyhow::Result<()> {
    let args = watch_args(argv);
    let settings = settings_for(server);
    tokio::time::timeout(Duration::from_secs(8), handle_watch(&args, &settings, true))
        .await
        .map_err(|_| anyhow::anyhow!("watch did not finish in time"))?
}

// ============================================================================
// Reload loop
// ============================================================================

#[tokio::test]
async fn test_watch_stops_after_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networks.json"))
        .respond_with(topology())
        .mount(&server)
        .await;

    run_watch(&server, &["-i", "1", "--count", "1", "BSNL Tower"])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_watch_applies_reloads_slower_than_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networks.json"))
        .respond_with(topology().set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;

    run_watch(&server, &["-i", "1", "--count", "1"]).await.unwrap();

    // Ticks that fire while a reload is in flight do not start another one
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_watch_counts_only_applied_reloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networks.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/networks.json"))
        .respond_with(topology())
        .mount(&server)
        .await;

    run_watch(&server, &["-i", "1", "--count", "2"]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}
