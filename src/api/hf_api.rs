use crate::config::{Config, with_trailing_slash};
use crate::error::MedError;
use crate::types::inference::{
    ClassificationResponse, Conversation, ConversationInputs, GenerationResponse, LabelScore,
    TextInputs, TranscriptionResponse,
};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Client for the hosted inference API. One POST per call, no retries.
#[derive(Clone)]
pub struct HfInferenceApi {
    client: reqwest::Client,
    base: Url,
    token: String,
    asr_model: String,
    classifier_model: String,
    chat_model: String,
}

impl HfInferenceApi {
    /// `None` when inference is not enabled in `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Option<Self>, MedError> {
        let Some(token) = cfg.inference_token() else {
            return Ok(None);
        };

        let mut builder = reqwest::Client::builder()
            .user_agent("meddonate/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.inference_timeout_secs.max(1)));
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Some(Self {
            client: builder.build()?,
            base: with_trailing_slash(cfg.hf_api_base.clone()),
            token: token.to_string(),
            asr_model: cfg.asr_model.clone(),
            classifier_model: cfg.classifier_model.clone(),
            chat_model: cfg.chat_model.clone(),
        }))
    }

    fn model_url(&self, model: &str) -> Result<Url, MedError> {
        Ok(self.base.join(model)?)
    }

    async fn post(
        &self,
        model: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, MedError> {
        let resp = request.bearer_auth(&self.token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(model, %status, body = %body.chars().take(200).collect::<String>(), "inference API rejected request");
            return Err(MedError::UpstreamStatus(status));
        }
        Ok(resp)
    }

    /// Speech to text for raw audio bytes.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String, MedError> {
        let url = self.model_url(&self.asr_model)?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .body(audio);
        let resp = self.post(&self.asr_model, request).await?;
        let payload: TranscriptionResponse = serde_json::from_slice(&resp.bytes().await?)?;
        let text = payload.text.trim();
        if text.is_empty() {
            return Err(MedError::EmptyInference);
        }
        debug!(chars = text.len(), "audio transcribed via inference API");
        Ok(text.to_string())
    }

    /// Top label from the text classification model.
    pub async fn classify(&self, text: &str) -> Result<LabelScore, MedError> {
        let url = self.model_url(&self.classifier_model)?;
        let request = self.client.post(url).json(&TextInputs {
            inputs: text.trim(),
        });
        let resp = self.post(&self.classifier_model, request).await?;
        let payload: ClassificationResponse = serde_json::from_slice(&resp.bytes().await?)?;
        payload.top().ok_or(MedError::EmptyInference)
    }

    /// Free-form reply from the conversational model.
    pub async fn generate(&self, text: &str) -> Result<String, MedError> {
        let url = self.model_url(&self.chat_model)?;
        let request = self.client.post(url).json(&ConversationInputs {
            inputs: Conversation {
                past_user_inputs: Vec::new(),
                generated_responses: Vec::new(),
                text: text.trim(),
            },
        });
        let resp = self.post(&self.chat_model, request).await?;
        let payload: GenerationResponse = serde_json::from_slice(&resp.bytes().await?)?;
        payload.into_text().ok_or(MedError::EmptyInference)
    }
}
