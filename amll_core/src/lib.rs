pub mod converter;
pub mod error;
pub mod markup;
pub mod model;

pub use converter::config::*;
pub use converter::format::*;
pub use error::*;
pub use markup::LyricMarkup;
pub use model::document::*;
pub use model::id::*;
