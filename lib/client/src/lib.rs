pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod transport;

pub use client::ApiClient;
pub use config::{BASE_URL_ENV, ClientConfig};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, ScriptedTransport,
    TransportError,
};
