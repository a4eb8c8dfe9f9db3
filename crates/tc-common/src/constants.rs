// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Size constants for the TrustCore engine
//!
//! Wire-visible sizes are fixed by the attestation protocol and must not
//! change between firmware revisions.

/// Challenge/response nonce size in bytes
pub const NONCE_SIZE: usize = 32;

/// Symmetric session key size in bytes (AES-256)
pub const SESSION_KEY_SIZE: usize = 32;

/// Session IV size in bytes
pub const SESSION_IV_SIZE: usize = 16;

/// AEAD authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// Digest size in bytes (SHA3-256)
pub const DIGEST_SIZE: usize = 32;

/// Key fingerprint size in bytes
pub const FINGERPRINT_SIZE: usize = 32;

/// Number of concurrent attestation sessions
pub const MAX_SESSIONS: usize = 16;

/// Number of registers carried in an attestation response
pub const ATTESTED_REGISTER_COUNT: usize = 3;

/// Number of measurement registers the engine addresses
pub const NUM_REGISTERS: usize = 16;

/// Maximum entries in the key custody store
pub const MAX_KEYS: usize = 32;

/// Maximum key material size in bytes (covers RSA-4096 private material)
pub const MAX_KEY_MATERIAL_SIZE: usize = 4096;

/// Maximum entries in the measurement event log
pub const MAX_EVENTS: usize = 64;

/// Maximum stored payload per measurement event in bytes
pub const MAX_EVENT_PAYLOAD_SIZE: usize = 1280;

/// Maximum payload copied into an exported event; larger payloads are
/// omitted from the export page with their length reported as zero
pub const EXPORT_PAYLOAD_CAP: usize = 1024;

/// Maximum plaintext accepted by a session export request
pub const MAX_EXPORT_SIZE: usize = 1024;

/// Rollback counter persisted size (8 big-endian bytes)
pub const COUNTER_SIZE: usize = 8;
