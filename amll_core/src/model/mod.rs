pub mod document;
pub mod id;
