pub mod admin;
pub mod interview;
