//! Incremental input handling for the tokenizer.

mod preprocessor;

pub use preprocessor::{Preprocessor, DEFAULT_BUFFER_WATERLINE};
