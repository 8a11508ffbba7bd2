//! SPARQL protocol access: query construction and endpoint transport

pub mod endpoint;
pub mod query;

pub use endpoint::{EndpointError, HttpSparqlEndpoint, SparqlEndpoint};
pub use query::RelatedQuery;
