pub mod client;
pub mod error;
pub mod model;

pub use client::{ApiClient, SearchBackend, StatsSource};
pub use error::ClientError;
pub use model::{CompanyResult, Contacts, QueryRequest, QueryResponse, Stats};
