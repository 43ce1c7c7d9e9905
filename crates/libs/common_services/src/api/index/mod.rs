pub mod error;
pub mod interfaces;
pub mod selection;
pub mod service;
