pub mod context_free;
pub mod names;
pub mod notation;
pub mod types;
