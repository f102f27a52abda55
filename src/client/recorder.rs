use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;

use crate::domain::AudioClip;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("no input device available")]
    DeviceUnavailable,
    #[error("microphone access failed: {0}")]
    DeviceAccess(String),
    #[error("recording already in progress")]
    AlreadyRecording,
    #[error("wav encoding failed: {0}")]
    Encoding(String),
}

/// Raw capture state for one recording: accumulated sample chunks plus the
/// stream parameters needed to encode them.
struct RecordingSession {
    chunks: Vec<Vec<f32>>,
    sample_rate: u32,
    channels: u16,
}

impl RecordingSession {
    fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            chunks: Vec::new(),
            sample_rate,
            channels,
        }
    }

    fn push_chunk(&mut self, chunk: Vec<f32>) {
        self.chunks.push(chunk);
    }

    /// Concatenate the chunks into a single in-memory WAV clip.
    fn finish(self) -> Result<AudioClip, RecorderError> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| RecorderError::Encoding(e.to_string()))?;

        for chunk in &self.chunks {
            for &sample in chunk {
                let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(scaled)
                    .map_err(|e| RecorderError::Encoding(e.to_string()))?;
            }
        }

        writer
            .finalize()
            .map_err(|e| RecorderError::Encoding(e.to_string()))?;

        Ok(AudioClip::from_recording(cursor.into_inner()))
    }
}

/// Microphone capture with an elapsed-seconds counter.
///
/// `start` acquires the default input device; failure to do so leaves all
/// state untouched. `stop` releases the device and yields the recording as
/// a single WAV clip. The counter keeps its final value after `stop` and
/// resets on the next `start`.
pub struct MicRecorder {
    stream: Option<cpal::Stream>,
    session: Option<Arc<Mutex<RecordingSession>>>,
    recording: Arc<AtomicBool>,
    elapsed_secs: Arc<AtomicU64>,
}

impl MicRecorder {
    pub fn new() -> Self {
        Self {
            stream: None,
            session: None,
            recording: Arc::new(AtomicBool::new(false)),
            elapsed_secs: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::Acquire)
    }

    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.stream.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(RecorderError::DeviceUnavailable)?;
        let supported = device
            .default_input_config()
            .map_err(|e| RecorderError::DeviceAccess(e.to_string()))?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let stream_config: cpal::StreamConfig = supported.clone().into();

        let session = Arc::new(Mutex::new(RecordingSession::new(sample_rate, channels)));
        let err_fn = |e: cpal::StreamError| tracing::warn!(error = %e, "Input stream error");

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                let session = Arc::clone(&session);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        session.lock().push_chunk(data.to_vec());
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let session = Arc::clone(&session);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let chunk = data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                        session.lock().push_chunk(chunk);
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::U16 => {
                let session = Arc::clone(&session);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        let chunk = data
                            .iter()
                            .map(|&s| s as f32 / u16::MAX as f32 * 2.0 - 1.0)
                            .collect();
                        session.lock().push_chunk(chunk);
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(RecorderError::DeviceAccess(format!(
                    "unsupported sample format: {:?}",
                    other
                )));
            }
        }
        .map_err(|e| RecorderError::DeviceAccess(e.to_string()))?;

        stream
            .play()
            .map_err(|e| RecorderError::DeviceAccess(e.to_string()))?;

        self.elapsed_secs.store(0, Ordering::Release);
        self.recording.store(true, Ordering::Release);
        spawn_elapsed_ticker(Arc::clone(&self.recording), Arc::clone(&self.elapsed_secs));

        tracing::debug!(sample_rate, channels, "Recording started");

        self.stream = Some(stream);
        self.session = Some(session);
        Ok(())
    }

    /// Stop capturing and return the recording as one clip. Calling stop
    /// with no recording in progress is a no-op.
    pub fn stop(&mut self) -> Result<Option<AudioClip>, RecorderError> {
        let Some(stream) = self.stream.take() else {
            return Ok(None);
        };

        self.recording.store(false, Ordering::Release);
        drop(stream);

        let Some(session) = self.session.take() else {
            return Ok(None);
        };

        let finished = {
            let mut locked = session.lock();
            RecordingSession {
                chunks: std::mem::take(&mut locked.chunks),
                sample_rate: locked.sample_rate,
                channels: locked.channels,
            }
        };

        let clip = finished.finish()?;
        tracing::debug!(
            bytes = clip.len(),
            elapsed_secs = self.elapsed_secs(),
            "Recording stopped"
        );
        Ok(Some(clip))
    }
}

impl Drop for MicRecorder {
    fn drop(&mut self) {
        // Stop the ticker thread and release the device if a recording is
        // still running when the owner goes away.
        self.recording.store(false, Ordering::Release);
        self.stream.take();
    }
}

fn spawn_elapsed_ticker(recording: Arc<AtomicBool>, elapsed_secs: Arc<AtomicU64>) {
    std::thread::spawn(move || {
        while recording.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_secs(1));
            if recording.load(Ordering::Acquire) {
                elapsed_secs.fetch_add(1, Ordering::Release);
            }
        }
    });
}
