// Vision module - template library and normalized cross-correlation matching.

pub mod error;
pub mod library;
pub mod matcher;
pub mod types;


pub use error::{VisionError, VisionResult};
pub use library::{Template, TemplateLibrary};
pub use matcher::{all_matches, annotate_match, best_match};
pub use types::Match;
