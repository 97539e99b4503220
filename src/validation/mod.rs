pub mod classifier;
pub mod confidence;

pub use classifier::DocumentClassifier;
pub use confidence::Verdict;
