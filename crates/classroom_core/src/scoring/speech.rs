//! crates/classroom_core/src/scoring/speech.rs
//!
//! Pronunciation and dictation scoring: transcribe the recording, then compare the
//! transcript with the expected text.

use tracing::{info, warn};

use crate::domain::SpeechScore;
use crate::error::{CoreError, CoreResult};
use crate::ports::SpeechToTextService;
use crate::scoring::text_accuracy::score_text;

pub async fn score_speech(
    stt: &dyn SpeechToTextService,
    audio_data: &[u8],
    expected_text: &str,
    tolerance: usize,
) -> CoreResult<SpeechScore> {
    let transcript = stt.transcribe_audio(audio_data).await.map_err(|e| {
        warn!("Transcription failed: {}", e);
        CoreError::Dependency(e)
    })?;
    let result = score_text(expected_text, &transcript, tolerance);
    info!(
        bytes = audio_data.len(),
        percentage = result.percentage,
        "Scored spoken answer"
    );
    Ok(SpeechScore { transcript, result })
}
