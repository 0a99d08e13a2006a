//! Frontend TTS client.

use super::frontend::parse_word_timings;
use crate::http::{decode_base64, http_client, read_json, transport};
use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, SpeechProviderConfig};
use reelsmith_error::{ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{SpeechOutput, SpeechRequest, SpeechSynthesizer};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

/// Envelope code meaning success.
const SUCCESS_CODE: i64 = 3000;

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    addition: Option<Addition>,
}

#[derive(Debug, Deserialize)]
struct Addition {
    /// Milliseconds, sent as a string
    #[serde(default)]
    duration: Option<Value>,
    /// Nested JSON document, sent as a string
    #[serde(default)]
    frontend: Option<String>,
}

impl Addition {
    fn duration_secs(&self) -> Option<f64> {
        let millis = match self.duration.as_ref()? {
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Number(n) => n.as_f64()?,
            _ => return None,
        };
        (millis > 0.0).then_some(millis / 1000.0)
    }
}

/// Speech synthesis through the frontend envelope API.
#[derive(Debug, Clone)]
pub struct FrontendSpeechSynthesizer {
    client: Client,
    endpoint: String,
    token: String,
    app_id: Option<String>,
    cluster: String,
    voice: String,
    encoding: String,
    sample_rate: u32,
    uid: String,
}

impl FrontendSpeechSynthesizer {
    /// Create a synthesizer from `[providers.speech]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token variable is unset.
    pub fn from_config(config: &SpeechProviderConfig) -> ReelsmithResult<Self> {
        let token = config.api_key().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::MissingApiKey(
                config
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| "providers.speech.api_key_env".to_string()),
            ))
        })?;
        Ok(Self {
            client: http_client()?,
            endpoint: config.base_url.clone(),
            token,
            app_id: config.app_id.clone(),
            cluster: config.cluster.clone(),
            voice: config.voice.clone(),
            encoding: config.encoding.clone(),
            sample_rate: config.sample_rate,
            uid: config.uid.clone(),
        })
    }

    fn body(&self, request: &SpeechRequest) -> Value {
        let mut app = json!({ "token": self.token, "cluster": self.cluster });
        if let Some(app_id) = &self.app_id {
            app["appid"] = json!(app_id);
        }
        json!({
            "app": app,
            "user": { "uid": self.uid },
            "audio": {
                "voice_type": self.voice,
                "encoding": self.encoding,
                "rate": self.sample_rate,
                "speed_ratio": request.speed_ratio,
            },
            "request": {
                "reqid": uuid::Uuid::new_v4().to_string(),
                "text": request.text,
                "operation": "query",
                "with_frontend": 1,
                "frontend_type": "unitTson",
            }
        })
    }

    fn mime_type(&self) -> String {
        match self.encoding.as_str() {
            "mp3" => "audio/mpeg".to_string(),
            "wav" => "audio/wav".to_string(),
            "ogg_opus" => "audio/ogg".to_string(),
            other => format!("audio/{}", other),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for FrontendSpeechSynthesizer {
    #[instrument(skip(self, request), fields(provider = "frontend_tts", voice = %self.voice, chars = request.text.chars().count()))]
    async fn synthesize(&self, request: &SpeechRequest) -> ReelsmithResult<SpeechOutput> {
        if request.text.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::InvalidRequest(
                "speech text is empty".to_string(),
            ))
            .into());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer;{}", self.token))
            .json(&self.body(request))
            .send()
            .await
            .map_err(transport)?;
        let envelope: Envelope = read_json(response).await?;

        if envelope.code != SUCCESS_CODE {
            return Err(ProviderError::new(ProviderErrorKind::Envelope {
                code: envelope.code,
                message: envelope.message,
            })
            .into());
        }
        let data = envelope.data.filter(|d| !d.is_empty()).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::EmptyResponse(
                "envelope has no audio data".to_string(),
            ))
        })?;
        let audio = decode_base64(&data)?;

        let word_timings = envelope
            .addition
            .as_ref()
            .and_then(|a| a.frontend.as_deref())
            .map(parse_word_timings)
            .unwrap_or_default();
        let duration_secs = envelope
            .addition
            .as_ref()
            .and_then(Addition::duration_secs)
            .or_else(|| word_timings.last().map(|w| w.end_time))
            .unwrap_or_else(|| {
                warn!("Speech response carried no duration");
                0.0
            });
        debug!(
            bytes = audio.len(),
            duration_secs,
            words = word_timings.len(),
            "Synthesized speech"
        );

        Ok(SpeechOutput {
            audio,
            mime_type: self.mime_type(),
            duration_secs,
            word_timings,
        })
    }

    fn provider_name(&self) -> &'static str {
        "frontend_tts"
    }
}
