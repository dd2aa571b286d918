use crate::api::hf_api::HfInferenceApi;
use crate::config::Config;
use crate::error::MedError;
use crate::service::chat_rules::{
    self, AUDIO_UNAVAILABLE_REPLY, Classification, ClassificationSource, EMPTY_PROMPT_REPLY,
    GENERATED_REPLY_NOTE, NOT_UNDERSTOOD_REPLY,
};
use serde::Serialize;
use tracing::{info, warn};

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Inference,
    Rules,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub mode: ChatMode,
    pub intent: Classification,
    pub transcript: Option<String>,
}

/// Donor chat: inference API when configured, keyword rules otherwise.
/// API failures are logged and answered from the rules.
#[derive(Clone)]
pub struct Assistant {
    inference: Option<HfInferenceApi>,
}

impl Assistant {
    pub fn new(inference: Option<HfInferenceApi>) -> Self {
        Self { inference }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, MedError> {
        Ok(Self::new(HfInferenceApi::from_config(cfg)?))
    }

    pub fn inference_enabled(&self) -> bool {
        self.inference.is_some()
    }

    pub async fn reply_to_text(&self, text: &str) -> ChatReply {
        let text = text.trim();
        if text.is_empty() {
            return ChatReply {
                reply: EMPTY_PROMPT_REPLY.to_string(),
                mode: ChatMode::Rules,
                intent: chat_rules::classify_by_rules(text),
                transcript: None,
            };
        }

        let intent = self.classify(text).await;

        if let Some(reply) = chat_rules::rule_reply(text) {
            return ChatReply {
                reply,
                mode: ChatMode::Rules,
                intent,
                transcript: None,
            };
        }

        if let Some(api) = &self.inference {
            match api.generate(text).await {
                Ok(generated) => {
                    return ChatReply {
                        reply: format!("{generated} {GENERATED_REPLY_NOTE}"),
                        mode: ChatMode::Inference,
                        intent,
                        transcript: None,
                    };
                }
                Err(e) => warn!(error = %e, "chat generation failed, using rule-based reply"),
            }
        }

        ChatReply {
            reply: NOT_UNDERSTOOD_REPLY.to_string(),
            mode: ChatMode::Rules,
            intent,
            transcript: None,
        }
    }

    /// Transcribe and answer. Without inference the clip is not sent anywhere.
    pub async fn reply_to_audio(&self, audio: Vec<u8>) -> ChatReply {
        let transcript = match &self.inference {
            Some(api) if !audio.is_empty() => match api.transcribe(audio).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(error = %e, "transcription failed, falling back to rules");
                    None
                }
            },
            _ => None,
        };

        let Some(transcript) = transcript else {
            return ChatReply {
                reply: AUDIO_UNAVAILABLE_REPLY.to_string(),
                mode: ChatMode::Rules,
                intent: chat_rules::classify_by_rules(""),
                transcript: None,
            };
        };

        info!(chars = transcript.len(), "answering transcribed audio");
        let mut reply = self.reply_to_text(&transcript).await;
        reply.transcript = Some(transcript);
        reply
    }

    async fn classify(&self, text: &str) -> Classification {
        if let Some(api) = &self.inference {
            match api.classify(text).await {
                Ok(top) => {
                    return Classification {
                        label: top.label,
                        score: top.score,
                        source: ClassificationSource::Inference,
                    };
                }
                Err(e) => warn!(error = %e, "intent classification failed, using keyword rules"),
            }
        }
        chat_rules::classify_by_rules(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rules_answer_without_inference() {
        let assistant = Assistant::new(None);
        assert!(!assistant.inference_enabled());

        let reply = assistant.reply_to_text("hello").await;
        assert_eq!(reply.mode, ChatMode::Rules);
        assert!(reply.reply.starts_with("Hello!"));
        assert_eq!(reply.intent.source, ClassificationSource::Rules);

        let reply = assistant.reply_to_text("qwerty zxcv").await;
        assert_eq!(reply.reply, NOT_UNDERSTOOD_REPLY);

        let reply = assistant.reply_to_text("   ").await;
        assert_eq!(reply.reply, EMPTY_PROMPT_REPLY);
    }

    #[tokio::test]
    async fn audio_is_skipped_without_inference() {
        let reply = Assistant::new(None).reply_to_audio(vec![1, 2, 3]).await;
        assert_eq!(reply.reply, AUDIO_UNAVAILABLE_REPLY);
        assert_eq!(reply.transcript, None);
        assert_eq!(reply.mode, ChatMode::Rules);
    }
}
