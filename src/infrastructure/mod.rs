pub mod observability;
pub mod transcription;
