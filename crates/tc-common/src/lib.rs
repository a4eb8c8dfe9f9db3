// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Veridian TrustCore Common Library
//!
//! This crate provides the shared types, error definitions, configuration
//! structures, and utilities used across all TrustCore engine components.
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `defmt`: Enable defmt logging support for embedded debugging
//!
//! # Security
//!
//! No heap allocations are performed - all buffers use fixed-size arrays or
//! heapless collections. Sensitive buffers are zeroized by their owners.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod constants;
pub mod errors;
pub mod log;
pub mod time;
pub mod types;
pub mod version;

// Re-export commonly used items
pub use config::EngineConfig;
pub use errors::{Error, Result};
pub use types::SessionId;
pub use version::KeyVersion;
