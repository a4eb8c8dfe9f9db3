// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Veridian TrustCore Attestation
//!
//! This crate implements the runtime attestation half of the trust engine:
//!
//! - **Eventlog**: hash-chained measurement event log
//! - **Session**: challenge/response protocol over an AEAD channel
//! - **Policy**: cacheable policy-digest evaluation
//! - **Wire**: protocol message codecs
//! - **Engine**: the lock-guarded facade binding everything together
//! - **Status**: read-only diagnostic surface
//!
//! # Protocol Overview
//!
//! ```text
//! Verifier                                    Prover (device)
//!    |                                              |
//!    |-------------- Challenge(id) --------------->|
//!    |         <- {nonce, timestamp}               |
//!    |                                              |
//!    |                                   Collect register values
//!    |                                   Build authenticated payload
//!    |                                              |
//!    |<---------------- Response ------------------|
//!    |   (nonce, timestamp, registers, data, tag)  |
//!    |                                              |
//!    | Authenticate payload                        |
//!    | Recompute each register independently       |
//!    |                                              |
//!    |-------------- accept / reject ------------->|
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod engine;
pub mod eventlog;
pub mod policy;
pub mod session;
pub mod status;
pub mod wire;

pub use engine::TrustEngine;
pub use eventlog::{MeasurementEvent, MeasurementLog};
pub use policy::{Policy, PolicyEvaluator};
pub use session::{SessionChannel, SessionState, SessionTable};
pub use status::{ServiceStatus, DIAG_SESSION_ID};
pub use wire::{Challenge, EventEntryExport, EventExport, EventlogStats, ExportMsg, Response};
