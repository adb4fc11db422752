mod common;

use std::sync::Arc;

use classroom_core::scoring::{score_speech, score_text_default, AnswerGrader};
use classroom_core::CoreError;
use common::{CannedTranscriber, FixedSimilarity, UnavailableSimilarity};

fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[tokio::test]
async fn identical_answer_with_all_keywords_scores_full_marks() {
    let grader = AnswerGrader::new(Arc::new(FixedSimilarity(1.0)));
    let answer = "Plants use sunlight to make food";

    let score = grader
        .grade_answer(answer, answer, &keywords(&["sunlight", "food"]))
        .await
        .unwrap();

    assert_eq!(score.keyword_score, 100.0);
    assert_eq!(score.semantic_score, 100.0);
    assert_eq!(score.text_accuracy_score, 100.0);
    assert_eq!(score.total_score, 100.0);
}

#[tokio::test]
async fn empty_keyword_list_scores_zero_keywords_without_nan() {
    let grader = AnswerGrader::new(Arc::new(FixedSimilarity(0.5)));

    let score = grader
        .grade_answer("water boils at one hundred degrees", "water boils at one hundred degrees", &[])
        .await
        .unwrap();

    assert_eq!(score.keyword_score, 0.0);
    assert!(!score.total_score.is_nan());
    // 0 * 0.4 + 50 * 0.4 + 100 * 0.2
    assert_eq!(score.total_score, 40.0);
}

#[tokio::test]
async fn similarity_outside_unit_range_is_clamped() {
    let grader = AnswerGrader::new(Arc::new(FixedSimilarity(1.7)));
    let score = grader.grade_answer("a", "b", &[]).await.unwrap();
    assert_eq!(score.semantic_score, 100.0);
}

#[tokio::test]
async fn similarity_outage_is_a_dependency_error() {
    let grader = AnswerGrader::new(Arc::new(UnavailableSimilarity));
    let err = grader
        .grade_answer("answer", "my answer", &keywords(&["answer"]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Dependency(_)));
}

#[tokio::test]
async fn speech_is_transcribed_then_scored() {
    let stt = CannedTranscriber(Some("The cat sat on the mat".to_string()));

    let score = score_speech(&stt, b"fake-audio", "The cat sat on the mat.", 2)
        .await
        .unwrap();

    assert_eq!(score.transcript, "The cat sat on the mat");
    assert_eq!(score.result.percentage, 100.0);
    assert_eq!(score.result.total_words, 6);
}

#[tokio::test]
async fn transcription_failure_is_a_dependency_error() {
    let stt = CannedTranscriber(None);
    let err = score_speech(&stt, b"fake-audio", "hello", 2).await.unwrap_err();
    assert!(matches!(err, CoreError::Dependency(_)));
}

#[test]
fn non_empty_text_against_silence_scores_zero() {
    for text in ["hello", "one two three", "Is it raining?"] {
        assert_eq!(score_text_default(text, "").percentage, 0.0);
    }
}
