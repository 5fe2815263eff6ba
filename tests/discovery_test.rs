use anyhow::Result;
use bookclub_feeds::core::fetcher::USER_AGENT;
use bookclub_feeds::core::ConfigProvider;
use bookclub_feeds::{CliConfig, DiscoveryPipeline, EtlEngine, HttpFetcher, LocalStorage};
use httpmock::prelude::*;
use tempfile::TempDir;

const TYPE_ID: &str = "644176e411597f2505a3ff5b";
const SERIES_ID: &str = "5e3b1c2d4f6a7b8c9d0e1f2a";

fn config(dir: &TempDir) -> CliConfig {
    CliConfig {
        input: dir.path().join("libraries.csv").to_string_lossy().into_owned(),
        output: dir.path().join("out/bookclubs.csv").to_string_lossy().into_owned(),
        user_agent: USER_AGENT.to_string(),
        timeout_secs: 5,
        delay_ms: 0,
        progress_every: 25,
        concurrent_libraries: 1,
        verbose: false,
        monitor: false,
        json_logs: false,
    }
}

async fn run(config: CliConfig) -> Result<String> {
    let fetcher = HttpFetcher::new(config.user_agent(), config.timeout())?;
    let pipeline = DiscoveryPipeline::new(LocalStorage::default(), config, fetcher);
    let engine = EtlEngine::new(pipeline);
    Ok(engine.run().await?)
}

#[tokio::test]
async fn test_end_to_end_discovery_with_real_http() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    // The unfiltered, filtered and series pages share a path; one body
    // serves all three.
    let events_page = format!(
        r#"<html><script>{{"id":"{type_id}","name":"Book Club"}}</script>
<h2>Event series: Mystery Readers</h2>
<a href="/v2/events?series={series_id}">Mystery Readers</a></html>"#,
        type_id = TYPE_ID,
        series_id = SERIES_ID
    );
    let events_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/events")
            .header("user-agent", USER_AGENT);
        then.status(200)
            .header("Content-Type", "text/html")
            .body(&events_page);
    });
    let login_mock = server.mock(|when, then| {
        when.method(GET).path("/events/rss/all");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>Please log in</html>");
    });
    let feed_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/events/rss")
            .query_param("series", SERIES_ID);
        then.status(200)
            .header("Content-Type", "application/rss+xml")
            .body("<?xml version=\"1.0\"?><rss><channel><item><title>Mystery Readers</title></item></channel></rss>");
    });

    std::fs::write(
        temp_dir.path().join("libraries.csv"),
        format!(
            "library_name,library_base_url\nMain Library,{}\nNo Url Library,\nOffline Library,http://127.0.0.1:1\n",
            server.base_url()
        ),
    )?;

    let config = config(&temp_dir);
    let output_path = config.output.clone();
    let written = run(config).await?;
    assert_eq!(written, output_path);

    events_mock.assert_hits(3);
    login_mock.assert_hits(2);
    feed_mock.assert();

    let csv = std::fs::read_to_string(&output_path)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "library_name,book_club_name,book_club_url,rss_url,notes");
    assert_eq!(
        lines[1],
        format!(
            "Main Library,Mystery Readers,{base}/v2/events?series={id},{base}/events/rss?series={id},validated",
            base = server.base_url(),
            id = SERIES_ID
        )
    );
    assert!(lines[2].starts_with("Offline Library,,,,"));
    assert!(lines[2].contains("error: "));

    Ok(())
}

#[tokio::test]
async fn test_events_page_failure_becomes_note() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/v2/events");
        then.status(503);
    });
    std::fs::write(
        temp_dir.path().join("libraries.csv"),
        format!("library_name,library_base_url\n,{}\n", server.base_url()),
    )?;

    let config = config(&temp_dir);
    let output_path = config.output.clone();
    run(config).await?;

    let csv = std::fs::read_to_string(&output_path)?;
    assert_eq!(
        csv,
        "library_name,book_club_name,book_club_url,rss_url,notes\n(unknown),,,,/v2/events HTTP 503\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_empty_input_writes_header_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("libraries.csv"),
        "library_name,library_base_url\n",
    )?;

    let config = config(&temp_dir);
    let output_path = config.output.clone();
    run(config).await?;

    assert_eq!(
        std::fs::read_to_string(&output_path)?,
        "library_name,book_club_name,book_club_url,rss_url,notes\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let result = run(config(&temp_dir)).await;

    assert!(result.is_err());
}
