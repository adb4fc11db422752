pub mod db;
pub mod similarity;
pub mod sst;

pub use db::DbAdapter;
pub use similarity::EmbeddingSimilarityAdapter;
pub use sst::OpenAiSstAdapter;
