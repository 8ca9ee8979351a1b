//! Cutout API
//!
//! HTTP surface for the batch background-removal service. Exposed as a
//! library so integration tests can build the router with a stubbed
//! segmentation capability.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
