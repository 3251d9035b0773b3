//! HTTP layer: transport seam, authorized client and reply decoding

mod client;
mod reply;
mod transport;

pub use client::AuthorizedClient;
pub use reply::{rejection_message, Reply};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
