use std::fs;
use std::time::Duration;

use examdash_engine::{
    ClientSettings, DashboardApi, ExamSummary, FailureKind, JobState, ReqwestDashboardApi,
    UploadOutcome,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestDashboardApi {
    ReqwestDashboardApi::new(&ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("api client")
}

fn write_pdf(dir: &TempDir) -> std::path::PathBuf {
    let file = dir.path().join("exam.pdf");
    fs::write(&file, b"%PDF-1.7\nfake exam body\n%%EOF").unwrap();
    file
}

#[tokio::test]
async fn upload_sends_multipart_file_and_reads_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-pdf"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"exam.pdf\""))
        .and(body_string_contains("%PDF-1.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "detail": "Upload successful",
            "examId": "42",
            "examName": "Midterm"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_pdf(&dir);
    let outcome = api_for(&server)
        .upload_pdf(&file, "exam.pdf")
        .await
        .expect("upload ok");

    assert_eq!(
        outcome,
        UploadOutcome::Finished(ExamSummary {
            exam_id: "42".to_string(),
            exam_name: "Midterm".to_string(),
        })
    );
}

#[tokio::test]
async fn upload_rejection_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-pdf"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "detail": "You can only upload up to 5 exams."
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_pdf(&dir);
    let err = api_for(&server)
        .upload_pdf(&file, "exam.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(403));
    assert_eq!(
        err.detail.as_deref(),
        Some("You can only upload up to 5 exams.")
    );
}

#[tokio::test]
async fn upload_with_non_json_success_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_pdf(&dir);
    let err = api_for(&server)
        .upload_pdf(&file, "exam.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn missing_local_file_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = api_for(&server)
        .upload_pdf(&dir.path().join("missing.pdf"), "missing.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::LocalFile);
}

#[tokio::test]
async fn job_status_parses_done_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job-status/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "done",
            "user_id": "u1",
            "result": { "examId": "42", "examName": "Midterm" }
        })))
        .mount(&server)
        .await;

    let report = api_for(&server).job_status("job-7").await.unwrap();
    assert_eq!(report.state, JobState::Done);
    assert_eq!(
        report.result,
        Some(ExamSummary {
            exam_id: "42".to_string(),
            exam_name: "Midterm".to_string(),
        })
    );
}

#[tokio::test]
async fn job_status_unknown_job_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job-status/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "Job not found"
        })))
        .mount(&server)
        .await;

    let err = api_for(&server).job_status("nope").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn job_status_times_out_on_slow_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job-status/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "status": "processing" })),
        )
        .mount(&server)
        .await;

    let api = ReqwestDashboardApi::new(&ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .unwrap();
    let err = api.job_status("slow").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn delete_accepts_any_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete_exam/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/delete_exam/43"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "Exam not found"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.delete_exam("42").await.expect("delete ok");

    let err = api.delete_exam("43").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.detail.as_deref(), Some("Exam not found"));
}
