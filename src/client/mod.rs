//! Client-side upload/record pipeline: clip acquisition, waveform peaks
//! for display, and the relay call to the transcribe endpoint. A UI embeds
//! this; nothing here is required for the server to run.

pub mod recorder;
pub mod session;
pub mod waveform;

pub use recorder::{MicRecorder, RecorderError};
pub use session::{TranscribeOutcome, TranscribeSession, GENERIC_FAILURE_MESSAGE};
pub use waveform::{Peak, WaveformError, WaveformView};
