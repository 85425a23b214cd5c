//! Input loading: name candidates from text reports and reference rows from
//! HTML-table exports.
//!
//! Both loaders take a sequence of [`InputFile`](crate::models::InputFile)s and
//! never abort on a bad file. A file that cannot be decoded or parsed is logged,
//! recorded as a failure and skipped; the rest of the batch is still loaded in
//! input order.

pub mod reference;
pub mod text;

pub use reference::{ReferenceLoad, load_reference_tables, parse_reference_html};
pub use text::{NameExtractor, TextLoad, extract_candidates};
