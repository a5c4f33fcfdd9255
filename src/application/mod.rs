pub mod lending;
pub mod registration;
