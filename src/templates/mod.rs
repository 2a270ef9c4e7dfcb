pub mod library;
pub mod scorer;

pub use library::TemplateLibrary;
pub use scorer::{cosine_distance, normalize_segment, score_segment};
