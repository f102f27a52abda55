mod audio_clip;

pub use audio_clip::{AudioClip, RECORDING_MEDIA_TYPE};
