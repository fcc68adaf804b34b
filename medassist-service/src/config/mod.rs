use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-call provider deadline.
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Default request body limit (20MB), which bounds uploaded images.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct MedassistConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub openai: OpenAiConfig,
    pub uploads: UploadConfig,
    /// Upper bound on a single provider round-trip.
    pub provider_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    /// Model for text and image diagnosis (e.g., gemini-1.5-flash)
    pub text_model: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    /// Vision-capable chat model used for prescriptions
    pub vision_model: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Keep prescription images on disk after they have been processed.
    pub retain: bool,
    pub max_bytes: usize,
}

impl MedassistConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(MedassistConfig {
            common: common_config,
            google: GoogleConfig {
                api_key: get_secret("GOOGLE_API_KEY")?,
                api_base: get_env(
                    "GEMINI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                    is_prod,
                )?,
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-1.5-flash"), is_prod)?,
            },
            openai: OpenAiConfig {
                api_key: get_secret("OPENAI_API_KEY")?,
                api_base: get_env("OPENAI_API_BASE", Some("https://api.openai.com/v1"), is_prod)?,
                vision_model: get_env("OPENAI_VISION_MODEL", Some("gpt-4o-2024-11-20"), is_prod)?,
            },
            uploads: UploadConfig {
                dir: get_env("UPLOAD_DIR", Some("uploads"), is_prod)?.into(),
                retain: parse_env("UPLOAD_RETAIN", true, is_prod)?,
                max_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES, is_prod)?,
            },
            provider_timeout: Duration::from_secs(parse_env(
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
                is_prod,
            )?),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(&default.to_string()), is_prod)?
        .trim()
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e)))
}

/// Credentials have no default in any environment; a blank value is as
/// unusable as a missing one.
fn get_secret(key: &str) -> Result<Secret<String>, AppError> {
    let secret = Secret::new(get_env(key, None, false)?.trim().to_string());
    if secret.expose_secret().is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is set but empty",
            key
        )));
    }
    Ok(secret)
}
