//! crates/surveysmith_core/src/format/mod.rs
//!
//! Export formatters. Both are pure, total functions over any validated
//! document: idempotent, order-preserving, and unable to fail.

pub mod forms;
pub mod markdown;

pub use forms::to_form_schema;
pub use markdown::to_markdown;
