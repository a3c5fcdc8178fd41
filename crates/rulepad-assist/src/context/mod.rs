//! Context analysis for the rules editor
//!
//! Turns a line of rule text plus a cursor column into a structured token:
//! - [`ContextClassifier`]: completion mode for the word before the cursor
//! - [`hover_target`]: rule name under the cursor for help lookups

mod classifier;
mod hover_target;
mod utils;

pub use classifier::ContextClassifier;
pub use hover_target::{hover_target, HoverTarget};
pub use utils::{comment_start, word_end, word_start};
