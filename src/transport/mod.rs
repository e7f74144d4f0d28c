//! HTTP plumbing shared by every client operation.
//!
//! ```text
//! request ──▶ send ──▶ classify ──▶ ConverterError
//!  (upload)   (reqwest)  (Failure)    (per operation)
//! ```
//!
//! 1. [`upload`]:   build multipart bodies whose chunks report progress
//! 2. [`classify`]: turn a reqwest error or non-2xx response into a
//!    [`classify::Failure`], then map it to the public error taxonomy for
//!    the operation that produced it

pub(crate) mod classify;
pub(crate) mod upload;
