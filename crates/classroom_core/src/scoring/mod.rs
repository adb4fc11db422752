pub mod grader;
pub mod speech;
pub mod text_accuracy;

pub use grader::AnswerGrader;
pub use speech::score_speech;
pub use text_accuracy::{levenshtein_distance, score_text, score_text_default};
