use std::path::Path;
use std::time::Duration;

use dash_logging::{dash_debug, dash_job};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde_json::Value;

use crate::{ApiError, ExamSummary, FailureKind, JobState, JobStatusReport, UploadOutcome};

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Covers the whole upload round trip, including server-side processing.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientSettings {
    pub fn base(&self) -> Result<Url, ApiError> {
        Url::parse(&self.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// The three dashboard endpoints the client talks to.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    async fn upload_pdf(&self, path: &Path, file_name: &str) -> Result<UploadOutcome, ApiError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError>;

    async fn delete_exam(&self, exam_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDashboardApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestDashboardApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base = settings.base()?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.base, segments)
    }
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait::async_trait]
impl DashboardApi for ReqwestDashboardApi {
    async fn upload_pdf(&self, path: &Path, file_name: &str) -> Result<UploadOutcome, ApiError> {
        let url = self.endpoint(&["upload-pdf"])?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ApiError::new(FailureKind::LocalFile, err.to_string()))?;
        dash_debug!("POST {} file={} bytes={}", url, file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(PDF_MIME)
            .map_err(map_reqwest_error)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = success_json(response).await?;
        Ok(classify_upload(&body))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError> {
        let url = self.endpoint(&["job-status", job_id])?;
        dash_job!(debug, job_id, "GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = success_json(response).await?;
        parse_job_status(&body)
    }

    async fn delete_exam(&self, exam_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["delete_exam", exam_id])?;
        dash_debug!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = read_detail(response).await;
        Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
            .with_detail(detail))
    }
}

/// Reads a success body as JSON, or turns a non-success status into an error
/// carrying the body's `detail`.
async fn success_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let detail = read_detail(response).await;
        return Err(
            ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                .with_detail(detail),
        );
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::new(FailureKind::MalformedBody, err.to_string()))
}

async fn read_detail(response: Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    let body: Value = serde_json::from_slice(&bytes).ok()?;
    text_field(&body, "detail")
}

/// Immediate result wins; otherwise `job_id`, falling back to a lone `examId`.
pub(crate) fn classify_upload(body: &Value) -> UploadOutcome {
    let exam_id = text_field(body, "examId");
    let exam_name = text_field(body, "examName");
    match (exam_id, exam_name) {
        (Some(exam_id), Some(exam_name)) => UploadOutcome::Finished(ExamSummary {
            exam_id,
            exam_name,
        }),
        (lone_exam_id, _) => match text_field(body, "job_id").or(lone_exam_id) {
            Some(job_id) => UploadOutcome::Queued { job_id },
            None => UploadOutcome::Incomplete,
        },
    }
}

pub(crate) fn parse_job_status(body: &Value) -> Result<JobStatusReport, ApiError> {
    let state = match body.get("status").and_then(Value::as_str) {
        Some("processing") => JobState::Processing,
        Some("done") => JobState::Done,
        Some("error") => JobState::Error,
        other => {
            return Err(ApiError::new(
                FailureKind::MalformedBody,
                format!("unexpected job status {other:?}"),
            ))
        }
    };
    // Failed jobs store an error record under `result`; only done jobs carry an exam.
    let result = match state {
        JobState::Done => body.get("result").and_then(|result| {
            Some(ExamSummary {
                exam_id: text_field(result, "examId")?,
                exam_name: text_field(result, "examName")?,
            })
        }),
        JobState::Processing | JobState::Error => None,
    };
    Ok(JobStatusReport { state, result })
}

/// Non-empty string field; numeric ids are accepted and stringified.
fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::MalformedBody, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_with_result_is_finished() {
        let outcome = classify_upload(&json!({
            "detail": "Upload successful",
            "examId": "42",
            "examName": "Midterm"
        }));
        assert_eq!(
            outcome,
            UploadOutcome::Finished(ExamSummary {
                exam_id: "42".to_string(),
                exam_name: "Midterm".to_string(),
            })
        );
    }

    #[test]
    fn upload_job_reference_variants() {
        assert_eq!(
            classify_upload(&json!({ "job_id": "job-1" })),
            UploadOutcome::Queued {
                job_id: "job-1".to_string()
            }
        );
        assert_eq!(
            classify_upload(&json!({ "examId": 17 })),
            UploadOutcome::Queued {
                job_id: "17".to_string()
            }
        );
        assert_eq!(
            classify_upload(&json!({ "detail": "Exam Uploaded Successfully" })),
            UploadOutcome::Incomplete
        );
    }

    #[test]
    fn error_status_ignores_error_record() {
        let report = parse_job_status(&json!({
            "status": "error",
            "user_id": "u1",
            "result": { "error": "boom" }
        }))
        .unwrap();
        assert_eq!(report.state, JobState::Error);
        assert_eq!(report.result, None);
    }

    #[test]
    fn unknown_status_is_malformed() {
        let err = parse_job_status(&json!({ "status": "queued" })).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedBody);
    }

    #[test]
    fn endpoint_encodes_segments() {
        let base = Url::parse("http://127.0.0.1:8000/").unwrap();
        let url = endpoint(&base, &["job-status", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/job-status/a%20b%2Fc");
    }
}
