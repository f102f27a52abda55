use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::domain::AudioClip;

/// Display columns produced per clip unless the caller asks otherwise.
pub const DEFAULT_WIDTH: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum WaveformError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
}

/// One display column: the lowest and highest amplitude in its bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub min: f32,
    pub max: f32,
}

/// Peak data for drawing one clip, plus the play/pause flag the display
/// toggles. Purely presentational; transcription never reads this.
pub struct WaveformView {
    peaks: Vec<Peak>,
    playing: bool,
}

impl WaveformView {
    /// Decode the clip and reduce it to `width` min/max buckets. Builds a
    /// fresh view each time; the caller replaces any previous one.
    pub fn render(clip: &AudioClip, width: usize) -> Result<Self, WaveformError> {
        let samples = decode_to_mono_pcm(&clip.bytes)?;
        Ok(Self {
            peaks: reduce_to_peaks(&samples, width),
            playing: false,
        })
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip between playing and paused, returning the new state.
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }
}

/// Decode arbitrary compressed or PCM audio into mono f32 samples.
fn decode_to_mono_pcm(data: &[u8]) -> Result<Vec<f32>, WaveformError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let hint = Hint::new();
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| WaveformError::DecodingFailed(format!("probe: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| WaveformError::DecodingFailed("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &decoder_opts)
        .map_err(|e| WaveformError::DecodingFailed(format!("codec: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(WaveformError::DecodingFailed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(WaveformError::DecodingFailed(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let samples = sample_buf.samples();

        if channels > 1 {
            for frame in samples.chunks(channels) {
                let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        } else {
            all_samples.extend_from_slice(samples);
        }
    }

    if all_samples.is_empty() {
        return Err(WaveformError::DecodingFailed(
            "no audio samples decoded".to_string(),
        ));
    }

    Ok(all_samples)
}

fn reduce_to_peaks(samples: &[f32], width: usize) -> Vec<Peak> {
    if samples.is_empty() || width == 0 {
        return Vec::new();
    }

    let bucket = samples.len().div_ceil(width);
    samples
        .chunks(bucket)
        .map(|chunk| {
            let mut peak = Peak {
                min: f32::INFINITY,
                max: f32::NEG_INFINITY,
            };
            for &sample in chunk {
                peak.min = peak.min.min(sample);
                peak.max = peak.max.max(sample);
            }
            peak
        })
        .collect()
}
