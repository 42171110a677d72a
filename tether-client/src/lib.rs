pub mod client;
pub mod error;
pub mod request;

pub use client::AdminClient;
pub use error::ClientError;
pub use request::{RequestBody, RequestBuilder, Response};
