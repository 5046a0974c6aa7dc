//! Integration tests for the download worker pool.
//!
//! These tests cover the pool's completion barrier, filename collisions,
//! idempotent re-runs and failure isolation against mock HTTP servers.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use firmware_fetch::download::{HttpClient, RunOutcome, WorkerPool};
use firmware_fetch::feed::FeedEntry;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts `count` artifacts at `/bin/fw-{i}.ota`, each expected exactly once.
async fn mount_artifacts(server: &MockServer, count: usize) -> Vec<FeedEntry> {
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let route = format!("/bin/fw-{i}.ota");
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("image {i}")))
            .expect(1)
            .mount(server)
            .await;
        entries.push(FeedEntry::new(format!("{}{route}", server.uri())));
    }
    entries
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_entry_attempted_exactly_once() {
    let server = MockServer::start().await;
    let entries = mount_artifacts(&server, 10).await;
    let dest = TempDir::new().unwrap();

    let pool = WorkerPool::new(HttpClient::new(), 3, true).unwrap();
    let report = pool.run(entries, dest.path()).await;

    assert_eq!(report.workers_started(), 3);
    assert_eq!(report.workers().len(), 3);
    assert_eq!(report.tasks_observed(), 10);
    assert_eq!(report.downloaded(), 10);

    let unique: HashSet<&str> = report.reports().map(|r| r.url.as_str()).collect();
    assert_eq!(unique.len(), 10, "no task may be observed twice");

    for i in 0..10 {
        let written = std::fs::read_to_string(dest.path().join(format!("fw-{i}.ota"))).unwrap();
        assert_eq!(written, format!("image {i}"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_workers_download_in_parallel() {
    let server = MockServer::start().await;
    let mut entries = Vec::new();
    for i in 0..4 {
        let route = format!("/slow/fw-{i}.ota");
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("slow")
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;
        entries.push(FeedEntry::new(format!("{}{route}", server.uri())));
    }
    let dest = TempDir::new().unwrap();

    let pool = WorkerPool::new(HttpClient::new(), 4, false).unwrap();
    let started = Instant::now();
    let report = pool.run(entries, dest.path()).await;
    let elapsed = started.elapsed();

    assert_eq!(report.downloaded(), 4);
    assert!(
        elapsed < Duration::from_millis(2400),
        "4 workers should overlap 4 slow downloads, took {elapsed:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_colliding_filenames_produce_one_download_and_one_already_exists() {
    let server = MockServer::start().await;
    for prefix in ["a", "b"] {
        let route = format!("/{prefix}/shared.ota");
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("from {prefix}")))
            .mount(&server)
            .await;
    }
    let entries = vec![
        FeedEntry::new(format!("{}/a/shared.ota", server.uri())),
        FeedEntry::new(format!("{}/b/shared.ota", server.uri())),
    ];
    let dest = TempDir::new().unwrap();

    let pool = WorkerPool::new(HttpClient::new(), 2, true).unwrap();
    let report = pool.run(entries, dest.path()).await;

    assert_eq!(report.tasks_observed(), 2);
    assert_eq!(report.downloaded(), 1);
    assert_eq!(report.already_existing(), 1);
    assert_eq!(report.failed(), 0);

    let written = std::fs::read_to_string(dest.path().join("shared.ota")).unwrap();
    assert!(written == "from a" || written == "from b", "unexpected content: {written}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_second_run_is_all_already_exists_and_leaves_files_untouched() {
    let server = MockServer::start().await;
    let mut entries = Vec::new();
    for i in 0..3 {
        let route = format!("/bin/fw-{i}.ota");
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh image"))
            .mount(&server)
            .await;
        entries.push(FeedEntry::new(format!("{}{route}", server.uri())));
    }
    let dest = TempDir::new().unwrap();
    let pool = WorkerPool::new(HttpClient::new(), 2, true).unwrap();

    let first = pool.run(entries.clone(), dest.path()).await;
    assert_eq!(first.downloaded(), 3);

    // Replace the content so any truncation or overwrite is visible.
    for i in 0..3 {
        std::fs::write(dest.path().join(format!("fw-{i}.ota")), b"kept").unwrap();
    }

    let second = pool.run(entries, dest.path()).await;
    assert_eq!(second.tasks_observed(), 3);
    assert_eq!(second.already_existing(), 3);
    assert_eq!(second.downloaded(), 0);

    for i in 0..3 {
        let content = std::fs::read(dest.path().join(format!("fw-{i}.ota"))).unwrap();
        assert_eq!(content, b"kept");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_failing_entry_does_not_affect_siblings() {
    let server = MockServer::start().await;
    let mut entries = mount_artifacts(&server, 4).await;
    entries.insert(2, FeedEntry::new("http://127.0.0.1:1/bin/unreachable.ota"));
    let dest = TempDir::new().unwrap();

    let client = HttpClient::with_timeouts(2, Some(10)).unwrap();
    let pool = WorkerPool::new(client, 2, true).unwrap();
    let report = pool.run(entries, dest.path()).await;

    assert_eq!(report.workers().len(), 2);
    assert_eq!(report.tasks_observed(), 5);
    assert_eq!(report.downloaded(), 4);
    assert_eq!(report.failed(), 1);

    let failed = report
        .reports()
        .find(|r| r.outcome.is_failed())
        .expect("one failure expected");
    assert!(failed.url.ends_with("unreachable.ota"));
    match &failed.outcome {
        RunOutcome::Failed(e) => assert!(e.is_transport()),
        other => panic!("Expected failure, got: {other:?}"),
    }
    assert!(!dest.path().join("unreachable.ota").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_more_workers_than_entries() {
    let server = MockServer::start().await;
    let entries = mount_artifacts(&server, 2).await;
    let dest = TempDir::new().unwrap();

    let pool = WorkerPool::new(HttpClient::new(), 8, true).unwrap();
    let report = pool.run(entries, dest.path()).await;

    assert_eq!(report.workers_started(), 8);
    assert_eq!(report.workers().len(), 8);
    assert_eq!(report.tasks_observed(), 2);
    assert_eq!(report.downloaded(), 2);
}
