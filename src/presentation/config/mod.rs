mod settings;

pub use settings::{ConfigError, ServerSettings, Settings, TranscriptionSettings, UploadSettings};
