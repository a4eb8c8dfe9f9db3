// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Veridian TrustCore Trust Anchor Boundary
//!
//! The trust anchor is the external capability the engine leans on for
//! everything it cannot provide itself: protected non-volatile storage, a
//! hardware random source, tamper-resistant measurement registers, and the
//! stream of measurement-event records. The real anchor is a secure element
//! reached over the device mailbox; this crate defines only its interface
//! plus `SoftAnchor`, an in-memory stand-in for hosts and tests.
//!
//! # Components
//!
//! - **Traits**: the [`TrustAnchor`] capability interface
//! - **Record**: the measurement-event record wire format
//! - **Sim**: the software simulator

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod record;
pub mod sim;
pub mod traits;

pub use error::{AnchorError, AnchorResult};
pub use record::EventRecord;
pub use sim::SoftAnchor;
pub use traits::TrustAnchor;
