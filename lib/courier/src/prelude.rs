//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types for easy glob
//! importing:
//!
//! ```
//! use courier::prelude::*;
//! ```

pub use crate::{
    Body, Client, Error, HyperTransport, Outcome, Request, Result, StatusCode, StatusError, Transport, header,
    transport_fn,
};
pub use serde::{Deserialize, Serialize};
