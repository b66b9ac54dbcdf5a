//! Link extraction from XHTML documents.
//!
//! [`tokens`] turns a document into a stream of tokens; [`extract_hrefs`]
//! picks the `href` values of anchor elements out of that stream.

mod extract;
pub mod tokens;

pub use extract::{extract_attribute_values, extract_hrefs};
pub use tokens::{Token, Tokens, XmlError};
