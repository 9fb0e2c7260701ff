use std::time::{Duration, Instant};

use dashboard_engine::{
    ClientSettings, EngineEvent, EngineHandle, EngineSettings, FailureKind, JobKind, PollSettings,
    RemoteStatus, SubmitRequest,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer) -> EngineHandle {
    EngineHandle::new(EngineSettings {
        client: ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        },
        poll: PollSettings {
            interval: Duration::from_millis(10),
            max_duration: None,
        },
    })
    .expect("engine")
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(Duration::from_secs(5))
        .expect("engine event")
}

/// Collects events until `done` matches one, or panics after five seconds.
fn events_until(engine: &EngineHandle, done: impl Fn(&EngineEvent) -> bool) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        if let Ok(event) = engine.recv_timeout(Duration::from_millis(50)) {
            let finished = done(&event);
            events.push(event);
            if finished {
                return events;
            }
        }
    }
    panic!("timed out waiting for engine events, got {events:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_then_poll_to_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/crawl"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "task_id": "abc123" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/task_status/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running",
            "progress": 20,
            "message": "正在搜索餐厅..."
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/task_status/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "progress": 100,
            "result": { "comment_count": 532 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.submit(SubmitRequest::Crawl {
        restaurant_name: "海底捞".into(),
        city: "上海".into(),
        months: 3,
    });

    let EngineEvent::Submitted { kind, task_id } = next_event(&engine) else {
        panic!("expected submission");
    };
    assert_eq!(kind, JobKind::Crawl);
    assert_eq!(task_id, "abc123");

    engine.start_polling(kind, task_id);
    let events = events_until(&engine, |event| {
        matches!(event, EngineEvent::Status { status, .. } if status.status.is_terminal())
    });
    let last = events.last().unwrap();
    assert!(matches!(
        last,
        EngineEvent::Status { status, .. } if status.status == RemoteStatus::Completed
    ));

    std::thread::sleep(Duration::from_millis(60));
    assert!(engine.try_recv().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_submission_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wordcloud"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "success": false, "error": "分析数据加载失败" })),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.submit(SubmitRequest::Wordcloud {
        analysis_filename: "a_analysis.json".into(),
    });

    let EngineEvent::SubmitFailed { kind, error } = next_event(&engine) else {
        panic!("expected submission failure");
    };
    assert_eq!(kind, JobKind::Wordcloud);
    assert_eq!(error.kind, FailureKind::Rejected);
    assert_eq!(error.message, "分析数据加载失败");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_polling_cancels_the_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/task_status/long"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.start_polling(JobKind::Analyze, "long");
    events_until(&engine, |event| matches!(event, EngineEvent::Status { .. }));

    engine.stop_polling(JobKind::Analyze, "long");
    std::thread::sleep(Duration::from_millis(50));
    while engine.try_recv().is_some() {}
    std::thread::sleep(Duration::from_millis(60));
    assert!(engine.try_recv().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn restarting_a_kind_replaces_the_previous_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/task_status/first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/task_status/second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.start_polling(JobKind::Crawl, "first");
    events_until(&engine, |event| matches!(event, EngineEvent::Status { .. }));
    engine.start_polling(JobKind::Crawl, "second");
    std::thread::sleep(Duration::from_millis(50));
    while engine.try_recv().is_some() {}

    let events = events_until(&engine, |event| matches!(event, EngineEvent::Status { .. }));
    std::thread::sleep(Duration::from_millis(50));
    let mut all = events;
    while let Some(event) = engine.try_recv() {
        all.push(event);
    }
    assert!(all.iter().all(|event| matches!(
        event,
        EngineEvent::Status { task_id, .. } if task_id == "second"
    )));
    engine.stop_polling(JobKind::Crawl, "second");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_stop_leaves_the_replacement_loop_running() {
    let server = MockServer::start().await;
    for task_id in ["old", "new"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/task_status/{task_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
            .mount(&server)
            .await;
    }

    let engine = engine_for(&server);
    engine.start_polling(JobKind::Analyze, "old");
    engine.start_polling(JobKind::Analyze, "new");
    engine.stop_polling(JobKind::Analyze, "old");
    std::thread::sleep(Duration::from_millis(50));
    while engine.try_recv().is_some() {}

    let events = events_until(&engine, |event| {
        matches!(event, EngineEvent::Status { task_id, .. } if task_id == "new")
    });
    assert!(!events.is_empty());

    engine.stop_polling(JobKind::Analyze, "new");
    std::thread::sleep(Duration::from_millis(50));
    while engine.try_recv().is_some() {}
    std::thread::sleep(Duration::from_millis(60));
    assert!(engine.try_recv().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listing_and_download_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data_files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "comment_files": [],
            "analysis_files": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/comments_a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"[]".to_vec()))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.list_files();
    let EngineEvent::FilesListed(Ok(files)) = next_event(&engine) else {
        panic!("expected listing");
    };
    assert!(files.comment_files.is_empty());
    assert!(files.analysis_files.is_empty());

    let temp = TempDir::new().unwrap();
    engine.download("comments_a.json", temp.path());
    let EngineEvent::Downloaded { filename, result } = next_event(&engine) else {
        panic!("expected download");
    };
    assert_eq!(filename, "comments_a.json");
    let written = result.expect("download ok");
    assert_eq!(std::fs::read(written).unwrap(), b"[]");
}
