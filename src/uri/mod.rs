//! Immutable URI value model
//!
//! A raw string goes through [`parser::parse`] into a [`Uri`], which can be
//! copied with modified components through its `with_*` methods and turned
//! back into a canonical string by [`composer::compose`].

pub mod composer;
pub mod encoding;
pub mod parser;
pub mod path;
pub mod query;
pub mod query_parameter;
pub mod stringable;
pub mod symbol;
pub mod value;


pub use path::Path;
pub use query::Query;
pub use query_parameter::{QueryParameter, QueryParameterValue};
pub use stringable::Stringable;
pub use value::{Uri, UriComponents};
