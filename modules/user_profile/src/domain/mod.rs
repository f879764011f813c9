pub mod cache;
pub mod error;
pub mod parser;
pub mod picture;
pub mod ports;
pub mod request;
pub mod service;
