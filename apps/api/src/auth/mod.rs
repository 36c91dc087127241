pub mod handlers;
pub mod models;
pub mod otp;
pub mod password;
pub mod repository;
pub mod token;
