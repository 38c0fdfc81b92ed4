pub mod ease;
pub mod kind;
pub mod scheduler;
