//! Request handler module
//!
//! Routing dispatch plus the two endpoint handlers.

mod lucky;
mod router;
mod sentiment;

// Re-export main entry point
pub use router::handle_request;
