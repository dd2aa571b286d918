use serde::{Deserialize, Serialize};

/// `{"text": "..."}` from the speech recognition model.
#[derive(Debug, Deserialize)]
pub struct TranscriptionResponse {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

/// Text classification comes back either flat or nested one level deep.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    /// Highest-scoring label, if any.
    pub fn top(self) -> Option<LabelScore> {
        let candidates = match self {
            Self::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            Self::Flat(flat) => flat,
        };
        candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Conversational models answer with an object or a one-element list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    One(GeneratedText),
    Many(Vec<GeneratedText>),
}

impl GenerationResponse {
    pub fn into_text(self) -> Option<String> {
        let text = match self {
            Self::One(g) => g.generated_text,
            Self::Many(list) => list.into_iter().next()?.generated_text,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct TextInputs<'a> {
    pub inputs: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ConversationInputs<'a> {
    pub inputs: Conversation<'a>,
}

#[derive(Debug, Serialize)]
pub struct Conversation<'a> {
    pub past_user_inputs: Vec<String>,
    pub generated_responses: Vec<String>,
    pub text: &'a str,
}
