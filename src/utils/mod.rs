//! Small shared helpers: text cleaning, counting, filename sanitization.

pub mod text;

pub use text::{
    char_count, char_prefix, clean_block_text, clean_message_text, sanitize_filename, word_count,
};
