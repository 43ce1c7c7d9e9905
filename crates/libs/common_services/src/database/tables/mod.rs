pub mod face_encoding;
pub mod photo;
