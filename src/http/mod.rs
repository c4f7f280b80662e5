//! HTTP utility module
//!
//! Response builders shared by all handlers.

pub mod response;

pub use response::{
    build_404_response, build_413_response, build_preflight_response, error_response,
    json_response,
};
