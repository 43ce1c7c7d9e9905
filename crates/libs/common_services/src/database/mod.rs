mod error;
mod pg_face_index;
pub mod stores;
pub mod tables;
mod utils;

pub use error::*;
pub use pg_face_index::*;
pub use stores::*;
pub use tables::*;
pub use utils::*;
