// api/client.rs
// HTTP backend for the transcription server

use super::{ApiError, ProgressStream, StatsPayload, SummaryPayload, TranscribeApi, TranscriptPayload};
use crate::config::ClientConfig;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::time::Duration;

const TRANSCRIBE_PATH: &str = "/transcribe/";
const TRANSCRIPT_PATH: &str = "/transcription/";
const SUMMARY_PATH: &str = "/summary/";
const STATS_PATH: &str = "/stats/";
const EVENT_STREAM_MIME: &str = "text/event-stream";

pub struct HttpBackend {
    server_url: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Self {
        // No global timeout: it would also cap the long-lived progress
        // stream. JSON requests get a per-request timeout instead.
        let client = reqwest::Client::builder().build().unwrap_or_default();

        tracing::info!("API client initialized for {}", config.server_url);

        Self {
            server_url: config.server_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        // The server reports "not yet available" as a JSON error body,
        // sometimes with a non-2xx status. A decodable body wins over the
        // status code so that message reaches the tab renderer.
        match serde_json::from_str::<T>(&body) {
            Ok(payload) => Ok(payload),
            Err(_) if !status.is_success() => Err(ApiError::Http {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(ApiError::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl TranscribeApi for HttpBackend {
    async fn upload_audio(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        tracing::info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(guess_audio_mime(file_name))
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let form = multipart::Form::new().part("file", file_part);

        let response = self
            .client
            .post(self.endpoint(TRANSCRIBE_PATH))
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn open_progress(&self) -> Result<ProgressStream, ApiError> {
        let response = self
            .client
            .get(self.endpoint(TRANSCRIBE_PATH))
            .header(reqwest::header::ACCEPT, EVENT_STREAM_MIME)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(map_reqwest_error));

        Ok(Box::pin(stream))
    }

    async fn fetch_transcript(&self) -> Result<TranscriptPayload, ApiError> {
        self.get_json(TRANSCRIPT_PATH).await
    }

    async fn fetch_summary(&self) -> Result<SummaryPayload, ApiError> {
        self.get_json(SUMMARY_PATH).await
    }

    async fn fetch_stats(&self) -> Result<StatsPayload, ApiError> {
        self.get_json(STATS_PATH).await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

fn guess_audio_mime(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some(ext) if ext.eq_ignore_ascii_case("mp3") => "audio/mpeg",
        _ => "audio/wav",
    }
}
