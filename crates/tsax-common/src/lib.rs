//! Common types and utilities for the tsax extractor.
//!
//! This crate provides foundational types used across all tsax crates:
//! - Source spans (`Span`)
//! - Comment ranges and comment text cleanup
//! - Centralized limits and thresholds

pub mod comments;
pub use comments::{CommentRange, clean_comment_text};

pub mod limits;

pub mod span;
pub use span::Span;
