//! Boxtrack Networking - session, token renewal, HTTP transport and API wrappers

pub mod api;
pub mod http;
pub mod refresh;
pub mod session;

pub use http::{ApiRequest, ApiResponse, AuthorizedClient, HttpTransport, Method, Reply, Transport};
pub use refresh::{Freshness, SessionRefresher};
pub use session::{Route, Session};
