//! Task pipelines
//!
//! Each pipeline is a short linear state machine over the chain operation
//! layer and the route resolver: strictly sequential stages, terminal on the
//! first unrecoverable failure. Errors propagate to the enclosing repeat
//! loop; nothing here retries beyond the policies owned by the lower layers.

pub mod liquidity;
pub mod mint;
pub mod swap;
pub mod tip;
