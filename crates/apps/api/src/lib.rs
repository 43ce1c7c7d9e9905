#![deny(clippy::unwrap_used)]
#![allow(
    clippy::needless_for_each,
    clippy::cognitive_complexity,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod api_state;
pub mod bulk_jobs;
mod routes;
mod server;

pub use routes::*;
pub use server::*;
