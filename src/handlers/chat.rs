use axum::{
    Json,
    extract::{Multipart, State},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::models::NewTranscription;
use crate::service::assistant::ChatReply;
use crate::types::forms::ChatRequest;
use crate::{MedError, router::AppState};

const DEFAULT_UPLOADER: &str = "anonymous";

#[derive(Debug, Serialize)]
pub struct AudioChatReply {
    #[serde(flatten)]
    pub reply: ChatReply,
    pub transcription_id: i64,
    pub saved_as: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatReply> {
    Json(state.assistant.reply_to_text(&req.message).await)
}

/// POST /api/chat/audio (multipart: `audio` file, optional `uploader`).
/// The clip is kept under the uploads directory and logged with its transcript.
pub async fn chat_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AudioChatReply>, MedError> {
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut uploader = String::new();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("audio") => {
                let name = field.file_name().unwrap_or("audio").to_string();
                let bytes = field.bytes().await?;
                audio = Some((name, bytes.to_vec()));
            }
            Some("uploader") => uploader = field.text().await?.trim().to_string(),
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    let Some((original_name, bytes)) = audio else {
        return Err(MedError::validation("An `audio` file field is required."));
    };
    if bytes.is_empty() {
        return Err(MedError::validation("Uploaded audio file is empty."));
    }
    if uploader.is_empty() {
        uploader = DEFAULT_UPLOADER.to_string();
    }

    let filename = stored_file_name(&original_name);
    tokio::fs::create_dir_all(state.uploads_dir.as_path()).await?;
    let path = state.uploads_dir.join(&filename);
    tokio::fs::write(&path, &bytes).await?;
    info!(file = %path.display(), bytes = bytes.len(), %uploader, "audio saved");

    let reply = state.assistant.reply_to_audio(bytes).await;

    let inserted = state
        .storage()
        .insert_transcription(&NewTranscription {
            filename: filename.clone(),
            filepath: path.display().to_string(),
            uploader,
            transcription: reply.transcript.clone(),
        })
        .await;
    let transcription_id = match inserted {
        Ok(id) => id,
        Err(e) => {
            // no row points at the file, so drop it
            if let Err(rm) = tokio::fs::remove_file(&path).await {
                warn!(file = %path.display(), error = %rm, "failed to remove orphaned upload");
            }
            return Err(e);
        }
    };

    Ok(Json(AudioChatReply {
        reply,
        transcription_id,
        saved_as: filename,
    }))
}

/// `<utc timestamp>_<sanitized name>`, safe to join onto the uploads directory.
fn stored_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.is_empty() { "audio" } else { cleaned };
    format!("{}_{cleaned}", Utc::now().format("%Y%m%d%H%M%S%3f"))
}
