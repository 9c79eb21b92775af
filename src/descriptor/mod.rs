//! Descriptor module for classifying proxy descriptors and extracting endpoints
//!
//! This module provides functionality for:
//! - Classifying raw descriptor lines into a closed set of kinds
//! - Extracting the (host, port) endpoint out of each supported kind
//!
//! Descriptors are treated as opaque text: only the endpoint is pulled out,
//! the protocol semantics are never validated here.

pub mod extractor;
pub mod models;

pub use extractor::extract;
pub use models::{Descriptor, DescriptorKind, Endpoint};
