//! HTTP implementations of the domain ports, built on `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use southmain_shared::config::{ApiConfig, StorageConfig};

use crate::{
    domain::{
        AnalyticsSink, AudioClip, ClientId, ClientIdProvider, PersonaApi, PersonaCard, PersonaId,
        TypingApi, TypingStatus, VoiceDropApi,
    },
    error::{ApiError, VoiceDropError},
    voice::STORAGE_BUCKET,
};

use super::dto::{AnalyticsEventRequest, ErrorResponse, TypingRequest, VoiceDropBroadcastRequest};

const CLIENT_ID_HEADER: &str = "x-client-id";

/// Thin wrapper around a shared `reqwest::Client` and the resolved endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }
}

/// Turn a non-success response into [`ApiError::Status`].
///
/// Only the `message`/`error` field of a JSON error body is kept; any other
/// body is logged and dropped.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    if message.is_none() && !body.trim().is_empty() {
        tracing::debug!(status = status.as_u16(), body = %body.trim(), "Unstructured error body");
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(ErrorResponse::into_message)
}

fn network_error(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

// ========================================
// Typing
// ========================================

/// `POST /api/chat/typing`
pub struct HttpTypingApi {
    api: ApiClient,
    client_id: ClientIdProvider,
    auth_token: Option<String>,
}

impl HttpTypingApi {
    pub fn new(api: ApiClient, client_id: ClientIdProvider, auth_token: Option<String>) -> Self {
        Self {
            api,
            client_id,
            auth_token,
        }
    }
}

#[async_trait]
impl TypingApi for HttpTypingApi {
    async fn notify(&self, status: TypingStatus) -> Result<(), ApiError> {
        let mut request = self
            .api
            .http
            .post(self.api.endpoint("/api/chat/typing"))
            .json(&TypingRequest { status });
        if let Some(client_id) = (self.client_id)() {
            request = request.header(CLIENT_ID_HEADER, client_id.as_str());
        }
        if let Some(token) = &self.auth_token {
            request = request.header(reqwest::header::AUTHORIZATION, bearer(token));
        }

        let response = request.send().await.map_err(network_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

// ========================================
// Analytics
// ========================================

/// `POST /api/analytics/event`
pub struct HttpAnalyticsSink {
    api: ApiClient,
}

impl HttpAnalyticsSink {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn send_event(
        &self,
        client_id: &ClientId,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), ApiError> {
        let response = self
            .api
            .http
            .post(self.api.endpoint("/api/analytics/event"))
            .header(CLIENT_ID_HEADER, client_id.as_str())
            .json(&AnalyticsEventRequest {
                event_name,
                payload,
            })
            .send()
            .await
            .map_err(network_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

// ========================================
// Personas
// ========================================

/// `GET /api/personas/{id}`
pub struct HttpPersonaApi {
    api: ApiClient,
}

impl HttpPersonaApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn persona_url(&self, persona_id: &PersonaId) -> Result<reqwest::Url, ApiError> {
        persona_url(&self.api.endpoint("/api/personas"), persona_id)
    }
}

fn persona_url(base: &str, persona_id: &PersonaId) -> Result<reqwest::Url, ApiError> {
    let mut url = reqwest::Url::parse(base).map_err(|e| ApiError::Network(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Network(format!("Cannot build persona URL from '{}'", base)))?
        .push(persona_id.as_str());
    Ok(url)
}

#[async_trait]
impl PersonaApi for HttpPersonaApi {
    async fn fetch_persona(&self, persona_id: &PersonaId) -> Result<PersonaCard, ApiError> {
        let response = self
            .api
            .http
            .get(self.persona_url(persona_id)?)
            .send()
            .await
            .map_err(network_error)?;
        ensure_success(response)
            .await?
            .json::<PersonaCard>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// ========================================
// Voice drops
// ========================================

/// Storage upload plus `POST /api/voice-drops`
pub struct HttpVoiceDropApi {
    api: ApiClient,
    storage: StorageConfig,
}

impl HttpVoiceDropApi {
    /// Fails when the configuration carries no storage credentials.
    pub fn new(api: ApiClient) -> Result<Self, VoiceDropError> {
        let storage = api
            .config()
            .storage
            .clone()
            .ok_or(VoiceDropError::MissingStorageConfig)?;
        Ok(Self { api, storage })
    }
}

fn object_url(storage: &StorageConfig, filename: &str) -> String {
    format!(
        "{}/storage/v1/object/{}/{}",
        storage.url, STORAGE_BUCKET, filename
    )
}

fn public_object_url(storage: &StorageConfig, filename: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        storage.url, STORAGE_BUCKET, filename
    )
}

#[async_trait]
impl VoiceDropApi for HttpVoiceDropApi {
    async fn upload_clip(
        &self,
        filename: &str,
        clip: &AudioClip,
        token: &str,
    ) -> Result<String, ApiError> {
        let response = self
            .api
            .http
            .post(object_url(&self.storage, filename))
            .header("apikey", &self.storage.anon_key)
            .header(reqwest::header::AUTHORIZATION, bearer(token))
            .header(reqwest::header::CONTENT_TYPE, &clip.mime_type)
            .header("x-upsert", "false")
            .body(clip.bytes.clone())
            .send()
            .await
            .map_err(network_error)?;
        ensure_success(response).await?;
        Ok(public_object_url(&self.storage, filename))
    }

    async fn broadcast(
        &self,
        audio_url: &str,
        duration_ms: u64,
        token: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .api
            .http
            .post(self.api.endpoint("/api/voice-drops"))
            .header(reqwest::header::AUTHORIZATION, bearer(token))
            .json(&VoiceDropBroadcastRequest {
                audio_url,
                duration_ms,
            })
            .send()
            .await
            .map_err(network_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageConfig {
        StorageConfig {
            url: "https://proj.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        }
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        // テスト項目: エラー本文の JSON に message があればそれを使う
        // given (前提条件):
        let body = r#"{"message":"Admin only"}"#;

        // when (操作):
        let message = error_message(body);

        // then (期待する結果):
        assert_eq!(message.as_deref(), Some("Admin only"));
    }

    #[test]
    fn test_error_message_ignores_unstructured_body() {
        // テスト項目: JSON でない本文や message の無い JSON はメッセージにならない
        // given (前提条件):
        let html = "<html><body>502 Bad Gateway</body></html>";
        let empty_json = r#"{"status":"down"}"#;

        // when (操作):
        let from_html = error_message(html);
        let from_json = error_message(empty_json);

        // then (期待する結果):
        assert_eq!(from_html, None);
        assert_eq!(from_json, None);
    }

    #[test]
    fn test_status_error_display() {
        // テスト項目: Status エラーの表示はメッセージの有無で変わる
        // given (前提条件):
        let with = ApiError::Status {
            status: 401,
            message: Some("Admin only".to_string()),
        };
        let without = ApiError::Status {
            status: 502,
            message: None,
        };

        // when (操作):

        // then (期待する結果):
        assert_eq!(with.to_string(), "HTTP 401: Admin only");
        assert_eq!(without.to_string(), "HTTP 502");
    }

    #[test]
    fn test_persona_url_escapes_id() {
        // テスト項目: persona id は URL のパスとしてエスケープされる
        // given (前提条件):
        let persona_id = PersonaId::new("a b/c".to_string()).unwrap();

        // when (操作):
        let url = persona_url("http://localhost:3000/api/personas", &persona_id).unwrap();

        // then (期待する結果):
        assert_eq!(url.as_str(), "http://localhost:3000/api/personas/a%20b%2Fc");
    }

    #[test]
    fn test_storage_urls() {
        // テスト項目: ストレージのアップロード先と公開 URL が正しく組み立てられる
        // given (前提条件):
        let storage = storage();

        // when (操作):
        let upload = object_url(&storage, "1_x.webm");
        let public = public_object_url(&storage, "1_x.webm");

        // then (期待する結果):
        assert_eq!(
            upload,
            "https://proj.supabase.co/storage/v1/object/audio-drops/1_x.webm"
        );
        assert_eq!(
            public,
            "https://proj.supabase.co/storage/v1/object/public/audio-drops/1_x.webm"
        );
    }

    #[test]
    fn test_voice_drop_api_requires_storage_config() {
        // テスト項目: ストレージ設定が無い場合は HttpVoiceDropApi を作れない
        // given (前提条件):
        let without = ApiClient::new(ApiConfig::new("http://localhost:3000")).unwrap();
        let with = ApiClient::new(
            ApiConfig::new("http://localhost:3000").with_storage("https://proj.supabase.co", "anon"),
        )
        .unwrap();

        // when (操作):
        let missing = HttpVoiceDropApi::new(without);
        let present = HttpVoiceDropApi::new(with);

        // then (期待する結果):
        assert!(matches!(missing, Err(VoiceDropError::MissingStorageConfig)));
        assert!(present.is_ok());
    }
}
