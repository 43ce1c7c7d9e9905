#![deny(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss
)]
mod bulk;
mod descriptor;
mod face;

pub use bulk::*;
pub use descriptor::*;
pub use face::*;
