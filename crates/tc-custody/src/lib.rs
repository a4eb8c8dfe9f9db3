// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Veridian TrustCore Key Custody
//!
//! Lifecycle management for the cryptographic keys a device carries, plus
//! the firmware anti-rollback counter:
//!
//! - **Keystore**: add / remove / revoke / rotate, with anchor-backed
//!   persistence for keys flagged `ANCHOR_STORED`
//! - **Rollback**: define-once monotonic counter gating firmware acceptance
//!
//! Neither component knows about attestation sessions; both are reached
//! through the engine facade which serializes access.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod keystore;
pub mod rollback;

pub use keystore::{KeyEntry, KeyFlags, KeyMeta, KeyRequest, KeyStore, KeyType};
