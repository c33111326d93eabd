use octoheat::config::PrinterSettings;
use octoheat::controller::{BedController, Decision, Outcome};
use octoheat::error::{OctoheatError, Result};
use octoheat::octoprint::{ApiRequest, ApiResponse, Transport};
use octoheat::schedule::{FixedClock, WorkHours};
use reqwest::Method;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const ENDPOINT: &str = "http://octopi.local";
const VERSION_URL: &str = "http://octopi.local/api/version";
const JOB_URL: &str = "http://octopi.local/api/job";
const BED_URL: &str = "http://octopi.local/api/printer/bed";

/// Canned printer that records every request it sees
#[derive(Default)]
struct MockPrinter {
    responses: HashMap<(Method, String), ApiResponse>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockPrinter {
    fn with_json(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(
            (Method::GET, url.to_string()),
            ApiResponse::new(200, body.to_string()),
        );
        self
    }

    fn with_post_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert((Method::POST, url.to_string()), ApiResponse::new(status, Vec::new()));
        self
    }

    fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn posts(&self) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|r| r.method == Method::POST)
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for MockPrinter {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(request.clone());
        self.responses
            .get(&(request.method.clone(), request.url.clone()))
            .cloned()
            .ok_or_else(|| OctoheatError::network(format!("connection refused: {}", request.url)))
    }
}

fn idle_printer(bed_target: f64) -> MockPrinter {
    MockPrinter::default()
        .with_json(VERSION_URL, json!({"api": "0.1", "server": "1.9.3"}))
        .with_json(JOB_URL, json!({"job": {"file": {}}, "state": "Operational"}))
        .with_json(BED_URL, json!({"bed": {"actual": 22.0, "target": bed_target}}))
        .with_post_status(BED_URL, 204)
}

fn settings() -> PrinterSettings {
    PrinterSettings {
        endpoint: Some(ENDPOINT.to_string()),
        api_key: Some("secret".to_string()),
        target: Some("60".to_string()),
        work_hours: WorkHours::default(),
    }
}

async fn run_at(printer: &Arc<MockPrinter>, hour: u32, settings: &PrinterSettings) -> Result<Outcome> {
    BedController::new(printer.clone(), Arc::new(FixedClock(hour)))
        .run(settings)
        .await
}

#[tokio::test]
async fn missing_configuration_makes_no_requests() {
    let cases: [fn(&mut PrinterSettings); 3] = [
        |s| s.endpoint = None,
        |s| s.api_key = None,
        |s| s.target = None,
    ];
    for clear in cases {
        let printer = Arc::new(idle_printer(0.0));
        let mut s = settings();
        clear(&mut s);

        let err = run_at(&printer, 10, &s).await.unwrap_err();
        assert!(matches!(err, OctoheatError::ConfigurationMissing { .. }));
        assert!(printer.calls().is_empty());
    }
}

#[tokio::test]
async fn every_request_carries_api_key() {
    let printer = Arc::new(idle_printer(0.0));
    run_at(&printer, 10, &settings()).await.unwrap();

    let calls = printer.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|r| r.api_key == "secret"));
    assert!(calls.iter().filter(|r| r.method == Method::GET).all(|r| r.body.is_none()));
}

#[tokio::test]
async fn bad_api_version_stops_before_job_check() {
    let printer = Arc::new(
        MockPrinter::default()
            .with_json(VERSION_URL, json!({"api": 0.05}))
            .with_json(JOB_URL, json!({"job": {}, "state": "Operational"})),
    );
    let err = run_at(&printer, 10, &settings()).await.unwrap_err();
    assert!(matches!(err, OctoheatError::BadApiVersion));
    assert_eq!(printer.calls().len(), 1);
}

// The version check fails soft on a malformed payload where the other
// operations raise InvalidResponse; the pipeline still reports a bad version.
#[tokio::test]
async fn version_payload_without_api_is_bad_version_not_invalid_response() {
    let printer = Arc::new(MockPrinter::default().with_json(VERSION_URL, json!({"server": "1.9.3"})));
    let err = run_at(&printer, 10, &settings()).await.unwrap_err();
    assert!(matches!(err, OctoheatError::BadApiVersion));

    let printer = Arc::new(MockPrinter::default().with_json(VERSION_URL, json!({"api": "n/a"})));
    let err = run_at(&printer, 10, &settings()).await.unwrap_err();
    assert!(matches!(err, OctoheatError::BadApiVersion));
}

#[tokio::test]
async fn running_job_never_touches_bed() {
    for state in ["Printing", "Paused", "Offline", "Error"] {
        let printer = Arc::new(
            MockPrinter::default()
                .with_json(VERSION_URL, json!({"api": "0.1"}))
                .with_json(JOB_URL, json!({"job": {}, "state": state}))
                .with_json(BED_URL, json!({"bed": {"actual": 22.0, "target": 0.0}}))
                .with_post_status(BED_URL, 204),
        );
        let err = run_at(&printer, 10, &settings()).await.unwrap_err();
        assert!(matches!(err, OctoheatError::JobInProgress { .. }));
        assert!(err.is_expected());
        assert!(printer.calls().iter().all(|r| r.url != BED_URL));
    }
}

#[tokio::test]
async fn work_hours_cold_bed_heats_once_to_configured_target() {
    let printer = Arc::new(idle_printer(0.0));
    let outcome = run_at(&printer, 10, &settings()).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Heated {
            target: 60.0,
            accepted: true
        }
    );

    let posts = printer.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].url, BED_URL);
    assert_eq!(posts[0].body, Some(json!({"command": "target", "target": 60})));
}

#[tokio::test]
async fn outside_work_hours_cools_whatever_the_target() {
    for bed_target in [0.0, 60.0] {
        let printer = Arc::new(idle_printer(bed_target));
        let outcome = run_at(&printer, 20, &settings()).await.unwrap();
        assert_eq!(outcome, Outcome::Cooled { accepted: true });

        let posts = printer.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].body, Some(json!({"command": "target", "target": 0})));
    }
}

#[tokio::test]
async fn work_hours_heating_bed_is_left_alone() {
    let printer = Arc::new(idle_printer(55.0));
    let outcome = run_at(&printer, 12, &settings()).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::NothingToDo {
            actual: 22.0,
            target: 55.0
        }
    );
    assert!(printer.posts().is_empty());
}

#[tokio::test]
async fn work_hour_boundaries_are_inclusive() {
    for (hour, heats) in [(7, false), (8, true), (18, true), (19, false)] {
        let printer = Arc::new(idle_printer(0.0));
        let outcome = run_at(&printer, hour, &settings()).await.unwrap();
        assert_eq!(matches!(outcome, Outcome::Heated { .. }), heats, "hour {hour}");
    }
}

#[tokio::test]
async fn custom_work_hours_from_settings() {
    let printer = Arc::new(idle_printer(0.0));
    let mut s = settings();
    s.work_hours = WorkHours {
        start_hour: 6,
        end_hour: 9,
    };
    let outcome = run_at(&printer, 10, &s).await.unwrap();
    assert_eq!(outcome, Outcome::Cooled { accepted: true });
}

#[tokio::test]
async fn malformed_bed_payload_is_invalid_response() {
    let printer = Arc::new(
        MockPrinter::default()
            .with_json(VERSION_URL, json!({"api": "0.1"}))
            .with_json(JOB_URL, json!({"job": {}, "state": "Operational"}))
            .with_json(BED_URL, json!({"bed": {"target": 0.0}})),
    );
    let err = run_at(&printer, 10, &settings()).await.unwrap_err();
    match err {
        OctoheatError::InvalidResponse { payload } => {
            assert_eq!(payload, r#"{"bed":{"target":0.0}}"#)
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
    assert!(printer.posts().is_empty());
}

#[tokio::test]
async fn job_payload_without_job_key_is_invalid_response() {
    let printer = Arc::new(
        MockPrinter::default()
            .with_json(VERSION_URL, json!({"api": "0.1"}))
            .with_json(JOB_URL, json!({"state": "Operational"})),
    );
    let err = run_at(&printer, 10, &settings()).await.unwrap_err();
    assert!(matches!(err, OctoheatError::InvalidResponse { .. }));
}

#[tokio::test]
async fn network_failure_propagates() {
    // No routes: every request fails at the transport
    let printer = Arc::new(MockPrinter::default());
    let err = run_at(&printer, 10, &settings()).await.unwrap_err();
    assert!(matches!(err, OctoheatError::Network { .. }));
    assert_eq!(printer.calls().len(), 1);
}

#[tokio::test]
async fn unacknowledged_command_is_reported() {
    let printer = Arc::new(
        MockPrinter::default()
            .with_json(VERSION_URL, json!({"api": "0.1"}))
            .with_json(JOB_URL, json!({"job": {}, "state": "Operational"}))
            .with_json(BED_URL, json!({"bed": {"actual": 22.0, "target": 0.0}}))
            .with_post_status(BED_URL, 409),
    );
    let outcome = run_at(&printer, 10, &settings()).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Heated {
            target: 60.0,
            accepted: false
        }
    );
}

#[tokio::test]
async fn dry_run_sends_no_command() {
    let printer = Arc::new(idle_printer(0.0));
    let outcome = BedController::new(printer.clone(), Arc::new(FixedClock(10)))
        .with_dry_run(true)
        .run(&settings())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::DryRun {
            decision: Decision::Heat(60.0)
        }
    );
    assert!(printer.posts().is_empty());
    assert_eq!(printer.calls().len(), 3);
}

/// Shared buffer a test subscriber writes formatted events into
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn reports_current_bed_temperature() {
    let captured = CapturedLog::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let printer = Arc::new(idle_printer(55.0));
    run_at(&printer, 12, &settings()).await.unwrap();

    let log = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(log.contains("Current bed temp: 22"), "log was: {log}");
}
