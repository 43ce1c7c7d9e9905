pub mod error;
pub mod interfaces;
pub mod registry;
pub mod service;
