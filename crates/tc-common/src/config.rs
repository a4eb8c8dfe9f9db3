// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Engine configuration
//!
//! Configuration is fixed at engine construction; no runtime reconfiguration
//! is allowed. Table capacities are compile-time constants (see
//! [`crate::constants`]); this struct carries the tunables that vary per
//! device family.

use crate::constants::ATTESTED_REGISTER_COUNT;

/// TrustCore engine configuration
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Policy digest cache time-to-live, in ticks
    pub policy_cache_ttl: u64,
    /// Registers a verifier must prove in an attestation response, in the
    /// order their values appear in the response
    pub attested_registers: [u32; ATTESTED_REGISTER_COUNT],
    /// Minimum log level recorded in the engine log buffer
    pub log_level: crate::log::LogLevel,
}

impl EngineConfig {
    /// Default configuration
    pub const DEFAULT: Self = Self {
        policy_cache_ttl: 1_000,
        attested_registers: [0, 1, 2],
        log_level: crate::log::LogLevel::Info,
    };
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
