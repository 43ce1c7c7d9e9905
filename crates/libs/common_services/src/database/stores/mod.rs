mod face_encoding_store;
mod photo_store;

pub use face_encoding_store::*;
pub use photo_store::*;
