use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::service::eligibility::DEFAULT_THRESHOLD_DAYS;

pub const CONFIG_FILE: &str = "meddonate.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub log_file: PathBuf,
    /// Key guarding the `/admin` routes. Empty disables them.
    pub admin_key: String,
    pub eligibility_threshold_days: i64,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,

    pub hf_api_token: Option<String>,
    #[serde(deserialize_with = "truthy")]
    pub use_hf_api: bool,
    pub hf_api_base: Url,
    pub asr_model: String,
    pub classifier_model: String,
    pub chat_model: String,
    pub inference_timeout_secs: u64,
    pub proxy: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:meddonation.db".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            log_file: PathBuf::from("app.log"),
            admin_key: String::new(),
            eligibility_threshold_days: DEFAULT_THRESHOLD_DAYS,
            uploads_dir: PathBuf::from("uploads"),
            max_upload_bytes: 25 * 1024 * 1024,
            hf_api_token: None,
            use_hf_api: false,
            hf_api_base: Url::parse("https://api-inference.huggingface.co/models/")
                .expect("static inference base url"),
            asr_model: "openai/whisper-tiny".to_string(),
            classifier_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            chat_model: "microsoft/DialoGPT-small".to_string(),
            inference_timeout_secs: 30,
            proxy: None,
        }
    }
}

impl Config {
    /// Defaults, then `meddonate.toml`, then `MEDDONATE_*` variables, then the
    /// bare `HF_API_TOKEN` / `USE_HF_API` variables. Any value that fails to
    /// parse is an error; nothing falls back to defaults.
    pub fn load() -> Result<Self, figment::Error> {
        let mut cfg: Self = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("MEDDONATE_"))
            .merge(Env::raw().only(&["HF_API_TOKEN", "USE_HF_API"]))
            .extract()?;
        cfg.hf_api_base = with_trailing_slash(cfg.hf_api_base);
        Ok(cfg)
    }

    /// Inference is used only when both the enable flag and a token are present.
    pub fn inference_token(&self) -> Option<&str> {
        if !self.use_hf_api {
            return None;
        }
        self.hf_api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Model names are joined onto the base, which drops a last segment
/// that lacks a trailing `/`.
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Str(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
    })
}
