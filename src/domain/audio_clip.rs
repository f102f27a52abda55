use uuid::Uuid;

/// Container type stamped on clips produced by the microphone recorder.
pub const RECORDING_MEDIA_TYPE: &str = "audio/wav";

/// An audio payload selected, dropped, or recorded by the user, together
/// with the media type and file name the source declared for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub file_name: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, media_type: String, file_name: String) -> Self {
        Self {
            bytes,
            media_type,
            file_name,
        }
    }

    /// Wrap a finished recording. Recordings always carry the fixed WAV
    /// container type and a generated file name.
    pub fn from_recording(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: RECORDING_MEDIA_TYPE.to_string(),
            file_name: format!("recording-{}.wav", Uuid::new_v4()),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
