//! Exchange capture: middleware that records one document per handled request
//!
//! The middleware buffers request and response bodies, rebuilds both streams
//! byte for byte, assembles an [`ExchangeRecord`] and hands it to the store.
//! Capture failures never fail the request they describe.

pub mod context;
pub mod middleware;
pub mod record;

pub use context::RequestContext;
pub use middleware::capture_exchange;
pub use record::ExchangeRecord;
