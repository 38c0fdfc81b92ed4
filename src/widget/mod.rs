pub mod definition;
pub mod registry;
pub mod schema;
