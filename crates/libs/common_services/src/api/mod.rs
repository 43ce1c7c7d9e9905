pub mod bulk;
pub mod index;
pub mod search;
