//! End-to-end pipeline tests against a local Graph API stub

mod common;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use calamine::{Data, Reader};
use scoutline_core::{
    AccountRecord, BatchWriter, FileSink, HttpConfig, Notifier, NotifyError, ProgressContext,
};
use scoutline_instagram::{Config, GraphClient, GraphConfig, ProfileSource, run, run_with};
use tempfile::TempDir;

use common::{Routes, StubGraph, write_input};

fn graph(stub: &StubGraph) -> GraphConfig {
    GraphConfig {
        base_url: stub.base_url.clone(),
        access_token: "tok".to_string(),
        media_limit: None,
        http: HttpConfig {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
        },
    }
}

fn config(input: PathBuf, output: PathBuf, stub: &StubGraph) -> Config {
    Config {
        input,
        output,
        graph: graph(stub),
        ..Default::default()
    }
}

fn quiet() -> ProgressContext {
    ProgressContext::with_tty(false)
}

fn read_xlsx(path: &Path) -> Vec<Vec<Data>> {
    let mut wb = calamine::open_workbook_auto(path).unwrap();
    let range = wb.worksheet_range_at(0).unwrap().unwrap();
    range.rows().map(|r| r.to_vec()).collect()
}

/// Writer that remembers every batch it was handed
#[derive(Default)]
struct RecordingWriter {
    batches: Vec<Vec<String>>,
}

impl BatchWriter for RecordingWriter {
    fn write_batch(&mut self, batch: &[AccountRecord]) -> std::io::Result<PathBuf> {
        self.batches
            .push(batch.iter().map(|r| r.id.clone()).collect());
        Ok(PathBuf::from("memory"))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, to: &str, username: &str) -> Result<(), NotifyError> {
        if to.starts_with("bounce") {
            return Err(NotifyError::Transport("550 mailbox unavailable".to_string()));
        }
        self.sent.borrow_mut().push(format!("{to}:{username}"));
        Ok(())
    }
}

#[test]
fn client_computes_engagement() {
    let stub = Routes::default().account("111", 1_000, 30, 20).serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();

    let record = client.fetch("111").unwrap();
    assert_eq!(record.id, "111");
    assert_eq!(record.username, "user_111");
    assert_eq!(record.followers_count, 1_000);
    assert_eq!(record.media_count, 7);
    assert_eq!(record.engagement_rate, 5.0);

    let hits = stub.hits();
    assert_eq!(hits.len(), 2);
    assert!(hits[0].starts_with("/111?"));
    assert!(hits[1].starts_with("/111/media?"));
    assert!(hits.iter().all(|h| h.contains("access_token=tok")));
}

#[test]
fn media_limit_is_sent() {
    let stub = Routes::default().account("5", 10, 0, 0).serve();
    let client = GraphClient::new(&GraphConfig {
        media_limit: Some(25),
        ..graph(&stub)
    })
    .unwrap();
    client.fetch("5").unwrap();
    assert!(stub.hits()[1].contains("limit=25"));
}

#[test]
fn zero_followers_zero_rate() {
    let stub = Routes::default().account("z", 0, 90, 10).serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();
    assert_eq!(client.fetch("z").unwrap().engagement_rate, 0.0);
}

#[test]
fn no_media_list_zero_rate() {
    let stub = Routes::default()
        .account("n", 1_000, 1, 1)
        .raw("/n/media", 200, r#"{"paging":{}}"#)
        .serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();
    let record = client.fetch("n").unwrap();
    assert_eq!(record.engagement_rate, 0.0);
    assert_eq!(record.followers_count, 1_000);
}

#[test]
fn http_error_is_fetch_error() {
    let stub = Routes::default()
        .raw(
            "/bad",
            400,
            r#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#,
        )
        .serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();
    let err = client.fetch("bad").unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Invalid OAuth access token."));
}

#[test]
fn media_failure_fails_account() {
    let stub = Routes::default()
        .account("m", 100, 1, 1)
        .raw("/m/media", 500, "oops")
        .serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();
    assert_eq!(client.fetch("m").unwrap_err().status(), Some(500));
}

#[test]
fn malformed_profile_is_parse_error() {
    let stub = Routes::default()
        .raw("/x", 200, r#"{"id":"x","username":"x"}"#)
        .serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();
    let err = client.fetch("x").unwrap_err();
    assert!(matches!(err, scoutline_instagram::FetchError::Parse(_)));
}

#[test]
fn media_item_missing_count_fails_account() {
    let stub = Routes::default()
        .account("h", 100, 1, 1)
        .raw("/h/media", 200, r#"{"data":[{"id":"m1","comments_count":3}]}"#)
        .serve();
    let client = GraphClient::new(&graph(&stub)).unwrap();
    let err = client.fetch("h").unwrap_err();
    assert!(matches!(err, scoutline_instagram::FetchError::Parse(_)));
}

#[test]
fn unreachable_host_is_network_error() {
    let client = GraphClient::new(&GraphConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        access_token: "SECRET".to_string(),
        media_limit: None,
        http: HttpConfig {
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(2),
        },
    })
    .unwrap();
    let err = client.fetch("1").unwrap_err();
    assert!(matches!(err, scoutline_instagram::FetchError::Network(_)));
    assert!(!err.to_string().contains("SECRET"));
}

#[test]
fn three_rows_one_survives_filter() {
    let stub = Routes::default()
        .raw("/broken", 500, "internal")
        .account("small", 500, 20, 5)
        .account("huge", 200_000, 1_000, 100)
        .serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.csv", "user_id\nbroken\nsmall\nhuge\n");
    let output = dir.path().join("out.xlsx");

    let summary = run(&config(input, output.clone(), &stub), None, &quiet()).unwrap();

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.fetch_failed, 1);
    assert_eq!(summary.filtered_out, 1);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.flushes, 1);

    let rows = read_xlsx(&output);
    assert_eq!(rows.len(), 2, "header + one record");
    assert_eq!(rows[1][0], Data::String("small".to_string()));
    assert_eq!(rows[1][2], Data::Float(500.0));
    assert_eq!(rows[1][4], Data::Float(5.0));

    // the failing account did not stop later fetches
    let hits = stub.hits();
    assert!(hits.iter().any(|h| h.starts_with("/small?")));
    assert!(hits.iter().any(|h| h.starts_with("/huge?")));
}

#[test]
fn every_emitted_record_is_under_ceiling() {
    let stub = Routes::default()
        .account("a", 10, 0, 0)
        .account("b", 99_999, 0, 0)
        .account("c", 100_001, 0, 0)
        .account("d", 5_000_000, 0, 0)
        .serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.csv", "user_id\na\nb\nc\nd\n");
    let mut writer = RecordingWriter::default();
    let cfg = config(input, dir.path().join("unused.xlsx"), &stub);

    let client = GraphClient::new(&cfg.graph).unwrap();
    run_with(&cfg, &client, None, &mut writer, &quiet()).unwrap();

    assert_eq!(writer.batches, vec![vec!["a".to_string(), "b".to_string()]]);
}

#[test]
fn batch_of_two_over_five_rows_flushes_three_times() {
    let mut routes = Routes::default();
    for id in ["r1", "r2", "r3", "r4", "r5"] {
        routes = routes.account(id, 100, 1, 0);
    }
    let stub = routes.serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.csv", "user_id\nr1\nr2\nr3\nr4\nr5\n");
    let output = dir.path().join("campaign.xlsx");
    let cfg = Config {
        batch_size: Some(2),
        ..config(input, output.clone(), &stub)
    };
    let client = GraphClient::new(&cfg.graph).unwrap();

    let mut writer = RecordingWriter::default();
    let summary = run_with(&cfg, &client, None, &mut writer, &quiet()).unwrap();
    assert_eq!(summary.flushes, 3);
    assert_eq!(
        writer.batches,
        vec![vec!["r1", "r2"], vec!["r3", "r4"], vec!["r5"]]
    );

    // each flush overwrites the named file: only the last partial batch remains
    let mut sink = FileSink::new(&output, false).unwrap();
    let summary = run_with(&cfg, &client, None, &mut sink, &quiet()).unwrap();
    assert_eq!(summary.flushes, 3);
    assert_eq!(summary.last_output.as_deref(), Some(output.as_path()));
    let rows = read_xlsx(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], Data::String("r5".to_string()));
}

#[test]
fn numbered_output_keeps_all_batches() {
    let mut routes = Routes::default();
    for id in ["r1", "r2", "r3"] {
        routes = routes.account(id, 100, 1, 0);
    }
    let stub = routes.serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.csv", "user_id\nr1\nr2\nr3\n");
    let cfg = Config {
        batch_size: Some(2),
        numbered: true,
        ..config(input, dir.path().join("out.csv"), &stub)
    };

    let summary = run(&cfg, None, &quiet()).unwrap();
    assert_eq!(summary.flushes, 2);
    let first = std::fs::read_to_string(dir.path().join("out_0001.csv")).unwrap();
    let second = std::fs::read_to_string(dir.path().join("out_0002.csv")).unwrap();
    assert_eq!(first.lines().count(), 3);
    assert_eq!(second.lines().count(), 2);
}

#[test]
fn rerun_is_byte_identical() {
    let stub = Routes::default()
        .account("a", 1_234, 17, 3)
        .account("b", 77, 5, 5)
        .serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.txt", "user_id\na\nb\n");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    run(&config(input.clone(), first.clone(), &stub), None, &quiet()).unwrap();
    run(&config(input, second.clone(), &stub), None, &quiet()).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);
    assert_eq!(String::from_utf8(a).unwrap().lines().count(), 3);
}

#[test]
fn campaign_skips_missing_email_and_keeps_going() {
    let stub = Routes::default()
        .account("a", 100, 1, 1)
        .account("b", 100, 1, 1)
        .account("c", 100, 1, 1)
        .account("d", 100, 1, 1)
        .serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(
        dir.path(),
        "in.csv",
        "user_id,email\na,a@example.com\nb,\nc,bounce@example.com\nd,d@example.com\n",
    );
    let cfg = config(input, dir.path().join("out.xlsx"), &stub);
    let notifier = RecordingNotifier::default();

    let summary = run(&cfg, Some(&notifier), &quiet()).unwrap();

    assert_eq!(
        notifier.sent.borrow().as_slice(),
        ["a@example.com:user_a", "d@example.com:user_d"]
    );
    assert_eq!(summary.emails_sent, 2);
    assert_eq!(summary.emails_failed, 1);
    assert_eq!(summary.missing_email, 1);
    // rows without an address are still recorded
    assert_eq!(summary.accepted, 4);
    assert_eq!(read_xlsx(&cfg.output).len(), 5);
}

#[test]
fn campaign_requires_email_column() {
    let stub = Routes::default().serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.csv", "user_id\na\n");
    let notifier = RecordingNotifier::default();

    let err = run(
        &config(input, dir.path().join("out.xlsx"), &stub),
        Some(&notifier),
        &quiet(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("column 'email' not found"));
    assert!(stub.hits().is_empty());
}

#[test]
fn unsupported_input_aborts_before_fetching() {
    let stub = Routes::default().serve();
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "in.json", "[]");

    let err = run(
        &config(input, dir.path().join("out.xlsx"), &stub),
        None,
        &quiet(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("unsupported file format"));
    assert!(stub.hits().is_empty());
    assert!(!dir.path().join("out.xlsx").exists());
}
