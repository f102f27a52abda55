use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub transcription: TranscriptionSettings,
    pub upload: UploadSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_upload_mb: usize,
}

impl UploadSettings {
    pub fn max_body_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is not set; refusing to start without a transcription credential")]
    MissingApiKey,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Settings {
    /// Read configuration from the process environment. A missing API key
    /// is a startup failure, not a request-time surprise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            server: ServerSettings {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env("SERVER_PORT", 3000)?,
            },
            transcription: TranscriptionSettings {
                api_key,
                base_url: env::var("GROQ_BASE_URL")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
                model: env::var("TRANSCRIBE_MODEL")
                    .unwrap_or_else(|_| "whisper-large-v3".to_string()),
                language: env::var("TRANSCRIBE_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            },
            upload: UploadSettings {
                max_upload_mb: parse_env("MAX_UPLOAD_MB", 20)?,
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test covers the whole env round trip: the variables are process
    // globals, so the cases have to run in a fixed order.
    #[test]
    fn given_process_environment_when_loading_settings_then_key_is_required_and_defaults_apply() {
        env::remove_var("GROQ_API_KEY");
        assert!(matches!(
            Settings::from_env(),
            Err(ConfigError::MissingApiKey)
        ));

        env::set_var("GROQ_API_KEY", "");
        assert!(matches!(
            Settings::from_env(),
            Err(ConfigError::MissingApiKey)
        ));

        env::set_var("GROQ_API_KEY", "gsk-test");
        env::remove_var("SERVER_PORT");
        env::remove_var("MAX_UPLOAD_MB");
        let settings = Settings::from_env().expect("settings should load");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.upload.max_upload_mb, 20);
        assert_eq!(settings.upload.max_body_bytes(), 20 * 1024 * 1024);
        assert_eq!(settings.transcription.model, "whisper-large-v3");
        assert_eq!(settings.transcription.language, "en");

        env::set_var("SERVER_PORT", "not-a-port");
        assert!(matches!(
            Settings::from_env(),
            Err(ConfigError::InvalidValue { name: "SERVER_PORT", .. })
        ));
        env::remove_var("SERVER_PORT");
        env::remove_var("GROQ_API_KEY");
    }
}
