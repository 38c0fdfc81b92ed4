pub mod composer;
pub mod document;
pub mod model;
