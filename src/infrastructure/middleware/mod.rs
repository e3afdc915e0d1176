// Request extractors shared by the HTTP handlers

pub mod viewer_context_extractor;

pub use viewer_context_extractor::{Viewer, API_KEY_HEADER};
