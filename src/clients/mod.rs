//! Clients - HTTP Clients for External APIs
//!
//! This module contains HTTP clients for communicating with external APIs.

pub mod vehicle_registry_client;

// Re-export main types for convenience
pub use vehicle_registry_client::{
    EnrichmentError,
    RegistryClientConfig,
    RegistryTransport,
    ReqwestTransport,
    TransportError,
    TransportReply,
    VehicleRegistryClient,
};
