pub mod client;
pub mod forwarder;
pub mod types;
pub mod validator;

pub use client::{HttpClient, ReqwestClient, TransportError};
pub use forwarder::{RequestForwarder, DEFAULT_TIMEOUT_MS};
pub use types::*;
pub use validator::{validate, Rejection, ValidationResult};
