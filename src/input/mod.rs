//! Input processing module
//! Handles résumé format detection and extraction, and composite text assembly

pub mod composite;
pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use composite::{build_candidate_supplement_text, build_candidate_text, build_posting_text};
pub use manager::extract_resume_text;
