//! Shared utility functions.
//!
//! - String truncation (UTF-8 safe, boundary-aware)
//! - Noun pluralization for user-facing text
//! - File name stems for caller-supplied ids

mod string;

pub use string::{count_noun, file_stem, take_chars, truncate_str};
