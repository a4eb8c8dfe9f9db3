// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Veridian TrustCore Cryptographic Primitives
//!
//! This crate provides the symmetric primitives the trust engine is built
//! on: SHA3-256 hashing, AES-256-GCM authenticated encryption, and a
//! SHA3-based deterministic random bit generator.
//!
//! Asymmetric operations (firmware image signature verification) happen
//! before this engine is reached and are deliberately absent here.
//!
//! # Design Principles
//!
//! 1. **Constant-time**: comparisons of secrets use constant-time primitives
//! 2. **Zeroization**: key material is zeroized on drop
//! 3. **no_std**: everything works without an allocator

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod aead;
pub mod error;
pub mod hash;
pub mod rng;
pub mod traits;
pub mod zeroize_utils;

pub use error::{CryptoError, CryptoResult};
pub use traits::{constant_time_eq, Aead, CryptoRng, Hash};
