mod groq_whisper_engine;

pub use groq_whisper_engine::GroqWhisperEngine;
