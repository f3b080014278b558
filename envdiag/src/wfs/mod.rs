//! Interrogation du service WFS (transport HTTP + classification)

pub mod client;
pub mod executor;

pub use client::{HttpClient, HttpResponse, ReqwestClient, TransportError};
pub use executor::{classify_response, execute_query, QueryOutcome};
