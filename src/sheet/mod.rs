pub mod builder;
pub mod loader;
pub mod model;
pub mod parse;
