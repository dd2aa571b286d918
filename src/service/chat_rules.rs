//! Keyword tables for the assistant when no inference API is in play.

use serde::Serialize;

pub const EMPTY_PROMPT_REPLY: &str =
    "I'm here to help with medicine donations. What would you like to know?";

pub const NOT_UNDERSTOOD_REPLY: &str = "Sorry, I couldn't understand that. I can explain donation \
     eligibility, NGO matching by city, or shelf-life rules. Try asking 'How do I donate paracetamol?'";

pub const AUDIO_UNAVAILABLE_REPLY: &str =
    "Transcription is not available right now. Please type your question instead.";

/// Appended to generated replies so donors still use the form for decisions.
pub const GENERATED_REPLY_NOTE: &str =
    "(Note: For medicine donation eligibility, please use the donation form for accurate results.)";

const MEDICINES: &[&str] = &["paracetamol", "amoxicillin", "cough syrup"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Greeting,
    Donate,
    Eligibility,
    Ngo,
    ShelfLife,
    Medicine,
    Help,
    Thanks,
}

/// Checked in order; the first topic with a matching keyword answers.
const TOPICS: &[(Topic, &[&str])] = &[
    (Topic::Greeting, &["hello", "hi", "hey", "greetings"]),
    (Topic::Donate, &["donate", "donation", "give"]),
    (Topic::Eligibility, &["eligibility", "eligible", "expiry", "expire"]),
    (Topic::Ngo, &["ngo", "organization", "where", "who accepts"]),
    (Topic::ShelfLife, &["shelf life", "shelf", "how long"]),
    (Topic::Medicine, MEDICINES),
    (Topic::Help, &["help", "how", "what"]),
    (Topic::Thanks, &["thank", "thanks"]),
];

/// Whole-word match for single words (prefix match for words of 4+ letters,
/// so "expire" also catches "expired"); plain substring for phrases and
/// contractions.
fn mentions(text: &str, keyword: &str) -> bool {
    if keyword.contains([' ', '\'']) {
        return text.contains(keyword);
    }
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| w == keyword || (keyword.len() >= 4 && w.starts_with(keyword)))
}

fn topic_of(text: &str) -> Option<Topic> {
    TOPICS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| mentions(text, k)))
        .map(|(topic, _)| *topic)
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canned reply for `text`, or `None` when no keyword applies.
pub fn rule_reply(text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    let reply = match topic_of(&lower)? {
        Topic::Greeting => "Hello! I'm the Medicine Donation Assistant. I can help you check if \
             your medicine is eligible for donation and find matching NGOs. How can I assist you today?"
            .to_string(),
        Topic::Donate => "Great! To donate medicine, fill out the donation form. I'll help you \
             check if your medicine is eligible based on expiry dates or shelf life. Make sure \
             your medicine has at least 180 days until expiry."
            .to_string(),
        Topic::Eligibility => "Medicine eligibility depends on expiry dates. If you have a \
             printed expiry date, it must be at least 180 days away. If not, we calculate it \
             from the manufacture date and shelf life."
            .to_string(),
        Topic::Ngo => "NGOs are matched based on your city. After checking eligibility, you'll \
             see a list of available NGOs in your area."
            .to_string(),
        Topic::ShelfLife => "Shelf life varies by medicine. For example, paracetamol tablets \
             typically last 36 months, while liquid medicines like cough syrup may last 12 \
             months. The system uses this to estimate expiry if no printed date is available."
            .to_string(),
        Topic::Medicine => {
            let medicine = MEDICINES
                .iter()
                .find(|m| mentions(&lower, m))
                .copied()
                .unwrap_or("your medicine");
            format!(
                "Great! {} can be donated if it meets the eligibility criteria. Please fill out \
                 the donation form with the medicine name '{medicine}' and your manufacture date \
                 to check eligibility.",
                title_case(medicine)
            )
        }
        Topic::Help => "I can help you with: 1) Checking medicine donation eligibility, 2) \
             Finding NGOs in your area, 3) Understanding shelf life requirements."
            .to_string(),
        Topic::Thanks => "You're welcome! If you have more questions, feel free to ask!".to_string(),
    };
    Some(reply)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Inference,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
    pub source: ClassificationSource,
}

/// Keyword sentiment used when the classifier model is unavailable.
pub fn classify_by_rules(text: &str) -> Classification {
    let lower = text.trim().to_lowercase();
    let (label, score) = if lower.is_empty() {
        ("NEUTRAL", 0.0)
    } else if ["donate", "medicine", "help", "ngo"]
        .iter()
        .any(|k| mentions(&lower, k))
    {
        ("POSITIVE", 0.7)
    } else if ["no", "not", "cannot", "can't"]
        .iter()
        .any(|k| mentions(&lower, k))
    {
        ("NEGATIVE", 0.6)
    } else {
        ("NEUTRAL", 0.5)
    };
    Classification {
        label: label.to_string(),
        score,
        source: ClassificationSource::Rules,
    }
}
