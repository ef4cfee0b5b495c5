pub mod config;
pub mod curl;
pub mod error;
pub mod history;
pub mod model;
pub mod proxy;
pub mod routes;

pub use config::Config;
pub use model::{Body, Header, HttpMethod, RequestDescriptor};
pub use proxy::{RequestForwarder, ResponseEnvelope};
pub use routes::{router, AppState};
