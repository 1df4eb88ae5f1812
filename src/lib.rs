pub mod cli;
pub mod error;
pub mod uri;
pub mod utils;

pub use error::{InvalidArgumentError, UriError};
pub use uri::{Path, Query, QueryParameter, QueryParameterValue, Stringable, Uri, UriComponents};
