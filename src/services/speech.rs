use crate::foundation::error::{ReelError, ReelResult};

/// Synthesized audio for one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechClip {
    /// Encoded audio (mp3).
    pub bytes: Vec<u8>,
    /// Length reported by the provider, when it reports one.
    pub duration_ms: Option<u64>,
}

/// Text-to-speech provider.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, voice_id: &str, text: &str) -> ReelResult<SpeechClip>;
}

pub const FISH_AUDIO_API_KEY_ENV: &str = "FISH_AUDIO_API_KEY";

/// Fish Audio connection settings.
#[derive(Clone, Debug, PartialEq)]
pub struct FishAudioConfig {
    pub base_url: String,
    /// Sent as the `model` header.
    pub model: String,
    /// Prosody speed multiplier.
    pub speed: f64,
}

impl Default for FishAudioConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.fish.audio".to_string(),
            model: "speech-1.6".to_string(),
            speed: 1.0,
        }
    }
}

/// Fish Audio TTS over its REST API.
pub struct FishAudioSpeech {
    client: reqwest::blocking::Client,
    api_key: String,
    config: FishAudioConfig,
}

impl FishAudioSpeech {
    pub fn new(api_key: impl Into<String>, config: FishAudioConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    /// Read the API key from `FISH_AUDIO_API_KEY`.
    pub fn from_env(config: FishAudioConfig) -> ReelResult<Self> {
        let key = std::env::var(FISH_AUDIO_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ReelError::validation(format!(
                    "{FISH_AUDIO_API_KEY_ENV} is not set (needed for speech synthesis)"
                ))
            })?;
        Ok(Self::new(key, config))
    }
}

/// JSON body of a Fish Audio TTS request.
pub fn fish_request_body(voice_id: &str, text: &str, speed: f64) -> serde_json::Value {
    serde_json::json!({
        "text": text,
        "reference_id": voice_id,
        "format": "mp3",
        "prosody": { "speed": speed },
    })
}

impl SpeechSynthesizer for FishAudioSpeech {
    fn synthesize(&self, voice_id: &str, text: &str) -> ReelResult<SpeechClip> {
        let url = format!("{}/v1/tts", self.config.base_url.trim_end_matches('/'));
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("model", &self.config.model)
            .json(&fish_request_body(voice_id, text, self.config.speed))
            .send()
            .map_err(|e| ReelError::service(format!("fish audio request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(ReelError::service(format!(
                "fish audio tts failed: {status}: {}",
                body.trim()
            )));
        }

        let bytes = res
            .bytes()
            .map_err(|e| ReelError::service(format!("failed to read fish audio response: {e}")))?;
        if bytes.is_empty() {
            return Err(ReelError::service("fish audio returned empty audio"));
        }
        Ok(SpeechClip {
            bytes: bytes.to_vec(),
            duration_ms: None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/speech.rs"]
mod tests;
