//! Prelude module for convenient imports.
//!
//! ```
//! use courier_core::prelude::*;
//! ```

pub use crate::{Body, Error, Outcome, Request, Result, StatusError, Transport, transport_fn};
