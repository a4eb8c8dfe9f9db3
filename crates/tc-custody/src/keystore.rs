// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Key custody store
//!
//! Bounded table of key entries, exclusively owned by the engine. Callers
//! only ever receive copies. Entries flagged `ANCHOR_STORED` are persisted
//! in the anchor's policy-protected storage before they become visible in
//! the table, so a storage failure can never leave a half-added key, and an
//! insert failure never leaves an orphaned anchor object.

use heapless::Vec;
use tc_anchor::TrustAnchor;
use tc_common::constants::{FINGERPRINT_SIZE, MAX_KEYS, MAX_KEY_MATERIAL_SIZE};
use tc_common::log::{LogBuffer, LogLevel};
use tc_common::{Error, KeyVersion, Result};
use tc_crypto::hash::Sha3_256;
use tc_crypto::zeroize_utils::secure_zero;
use tc_crypto::Hash;

/// Key algorithm type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum KeyType {
    /// RSA with 2048-bit modulus
    Rsa2048 = 1,
    /// RSA with 4096-bit modulus
    Rsa4096 = 2,
    /// ECDSA over P-256
    EcdsaP256 = 3,
    /// ECDSA over P-384
    EcdsaP384 = 4,
}

impl TryFrom<u32> for KeyType {
    type Error = Error;

    fn try_from(v: u32) -> Result<Self> {
        match v {
            1 => Ok(Self::Rsa2048),
            2 => Ok(Self::Rsa4096),
            3 => Ok(Self::EcdsaP256),
            4 => Ok(Self::EcdsaP384),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Key entry flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyFlags(u32);

impl KeyFlags {
    /// Key has been revoked; set once, never cleared
    pub const REVOKED: Self = Self(1 << 0);
    /// Key has passed its expiration time
    pub const EXPIRED: Self = Self(1 << 1);
    /// Primary key of its type
    pub const PRIMARY: Self = Self(1 << 2);
    /// Backup key of its type
    pub const BACKUP: Self = Self(1 << 3);
    /// Material persisted in anchor protected storage
    pub const ANCHOR_STORED: Self = Self(1 << 4);
    /// Use requires a fresh attestation quote
    pub const QUOTE_REQUIRED: Self = Self(1 << 5);
    /// Use requires a matching policy digest
    pub const POLICY_REQUIRED: Self = Self(1 << 6);

    /// No flags set
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create from raw bits
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit representation
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether all bits of `other` are set
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of two flag sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set all bits of `other`
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Key metadata, safe to hand out by value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMeta {
    /// Unique key identifier
    pub id: u32,
    /// Key algorithm type
    pub key_type: KeyType,
    /// Flag bits
    pub flags: KeyFlags,
    /// Key version
    pub version: KeyVersion,
    /// Creation time (device epoch)
    pub creation_time: u64,
    /// Expiration time (device epoch; zero means never)
    pub expiration_time: u64,
    /// SHA3-256 of the key material, computed once at creation
    pub fingerprint: [u8; FINGERPRINT_SIZE],
}

/// A full key entry: metadata plus material
///
/// Returned by value from [`KeyStore::get`]; the material buffer is
/// zeroized when the copy is dropped.
#[derive(Debug)]
pub struct KeyEntry {
    /// Key metadata
    pub meta: KeyMeta,
    material: Vec<u8, MAX_KEY_MATERIAL_SIZE>,
}

impl KeyEntry {
    /// Key material bytes
    #[must_use]
    pub fn material(&self) -> &[u8] {
        &self.material
    }
}

impl Clone for KeyEntry {
    fn clone(&self) -> Self {
        let mut material = Vec::new();
        // Capacity is identical; this cannot fail
        let _ = material.extend_from_slice(&self.material);
        Self {
            meta: self.meta,
            material,
        }
    }
}

impl Drop for KeyEntry {
    fn drop(&mut self) {
        secure_zero(&mut self.material);
    }
}

/// Parameters for adding or rotating in a key
#[derive(Clone, Copy)]
pub struct KeyRequest<'a> {
    /// Unique key identifier
    pub id: u32,
    /// Key algorithm type
    pub key_type: KeyType,
    /// Flag bits
    pub flags: KeyFlags,
    /// Key version
    pub version: KeyVersion,
    /// Creation time (device epoch)
    pub creation_time: u64,
    /// Expiration time (device epoch; zero means never)
    pub expiration_time: u64,
    /// Key material
    pub material: &'a [u8],
}

/// Bounded key custody table
pub struct KeyStore {
    entries: Vec<KeyEntry, MAX_KEYS>,
}

impl KeyStore {
    /// Create an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries currently present
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.entries.iter().position(|e| e.meta.id == id)
    }

    /// Add a new key entry
    ///
    /// Validates the request, computes the fingerprint, persists the
    /// material in the anchor when `ANCHOR_STORED` is requested, then
    /// inserts. Any failure unwinds all partial work before returning.
    pub fn add<A: TrustAnchor>(&mut self, anchor: &mut A, req: &KeyRequest<'_>) -> Result<()> {
        if req.material.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if req.material.len() > MAX_KEY_MATERIAL_SIZE {
            return Err(Error::BufferTooSmall);
        }
        if self.position(req.id).is_some() {
            return Err(Error::AlreadyExists);
        }
        if self.entries.len() == self.entries.capacity() {
            return Err(Error::KeyStoreFull);
        }

        let fingerprint = Sha3_256::hash(req.material).into_bytes();

        let anchor_stored = req.flags.contains(KeyFlags::ANCHOR_STORED);
        if anchor_stored {
            anchor
                .store_object(req.id, req.material)
                .map_err(Error::from)?;
        }

        let mut material = Vec::new();
        // Length checked above; capacity equals the bound
        let _ = material.extend_from_slice(req.material);

        let entry = KeyEntry {
            meta: KeyMeta {
                id: req.id,
                key_type: req.key_type,
                flags: req.flags,
                version: req.version,
                creation_time: req.creation_time,
                expiration_time: req.expiration_time,
                fingerprint,
            },
            material,
        };

        if self.entries.push(entry).is_err() {
            // Capacity was checked; unwind the anchor object all the same
            if anchor_stored {
                let _ = anchor.delete_object(req.id);
            }
            return Err(Error::KeyStoreFull);
        }

        Ok(())
    }

    /// Remove a key entry
    ///
    /// For anchor-stored keys the protected object is deleted first; if
    /// that fails the entry is retained and the anchor error is returned,
    /// so protected storage never holds an object without a table entry.
    pub fn remove<A: TrustAnchor>(&mut self, anchor: &mut A, id: u32) -> Result<()> {
        let pos = self.position(id).ok_or(Error::NotFound)?;

        if self.entries[pos].meta.flags.contains(KeyFlags::ANCHOR_STORED) {
            match anchor.delete_object(id) {
                Ok(()) | Err(tc_anchor::AnchorError::ObjectNotFound) => {}
                Err(_) => return Err(Error::AnchorFailure),
            }
        }

        // Entry material is zeroized by KeyEntry::drop
        self.entries.swap_remove(pos);
        Ok(())
    }

    /// Revoke a key
    ///
    /// Sets `REVOKED` (monotonic: no operation other than `remove` makes
    /// the id non-revoked again). For anchor-stored keys an anchor-side
    /// verification pass runs afterwards; its failure is logged but does
    /// not block the flag update - revocation must always succeed locally.
    pub fn revoke<A: TrustAnchor>(
        &mut self,
        anchor: &mut A,
        log: &mut LogBuffer,
        id: u32,
        now: u64,
    ) -> Result<()> {
        let pos = self.position(id).ok_or(Error::NotFound)?;

        self.entries[pos].meta.flags.insert(KeyFlags::REVOKED);

        if self.entries[pos].meta.flags.contains(KeyFlags::ANCHOR_STORED) {
            let fingerprint = self.entries[pos].meta.fingerprint;
            match anchor.verify_object(id, &fingerprint) {
                Ok(true) => {}
                Ok(false) => log.log(
                    LogLevel::Warn,
                    now,
                    "custody",
                    format_args!("anchor object mismatch for revoked key {id}"),
                ),
                Err(_) => log.log(
                    LogLevel::Warn,
                    now,
                    "custody",
                    format_args!("anchor verify failed for key {id}, revocation kept"),
                ),
            }
        }

        Ok(())
    }

    /// Get a copy of a key entry
    pub fn get(&self, id: u32) -> Result<KeyEntry> {
        let pos = self.position(id).ok_or(Error::NotFound)?;
        Ok(self.entries[pos].clone())
    }

    /// Copy up to `out.len()` entry metadata records; returns the count
    pub fn list(&self, out: &mut [KeyMeta]) -> usize {
        let count = self.entries.len().min(out.len());
        for (dst, entry) in out.iter_mut().zip(self.entries.iter()) {
            *dst = entry.meta;
        }
        count
    }

    /// Rotate a key: add the replacement, then revoke the old entry
    ///
    /// Best-effort two-step sequence, not atomic: if the revoke step fails
    /// a compensating remove of the replacement is attempted before the
    /// error is returned.
    pub fn rotate<A: TrustAnchor>(
        &mut self,
        anchor: &mut A,
        log: &mut LogBuffer,
        old_id: u32,
        req: &KeyRequest<'_>,
        now: u64,
    ) -> Result<()> {
        if req.id == old_id {
            return Err(Error::InvalidArgument);
        }
        if self.position(old_id).is_none() {
            return Err(Error::NotFound);
        }

        self.add(anchor, req)?;

        if let Err(e) = self.revoke(anchor, log, old_id, now) {
            let _ = self.remove(anchor, req.id);
            return Err(e);
        }

        Ok(())
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_anchor::SoftAnchor;

    fn request(id: u32, material: &[u8]) -> KeyRequest<'_> {
        KeyRequest {
            id,
            key_type: KeyType::EcdsaP256,
            flags: KeyFlags::empty(),
            version: KeyVersion::new(1, 0, 0),
            creation_time: 1000,
            expiration_time: 0,
            material,
        }
    }

    #[test]
    fn test_add_and_get() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);

        store.add(&mut anchor, &request(1, b"material")).unwrap();

        let entry = store.get(1).unwrap();
        assert_eq!(entry.meta.id, 1);
        assert_eq!(entry.material(), b"material");
        assert_eq!(
            entry.meta.fingerprint,
            Sha3_256::hash(b"material").into_bytes()
        );
    }

    #[test]
    fn test_add_rejects_empty_material() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        assert_eq!(
            store.add(&mut anchor, &request(1, b"")),
            Err(Error::InvalidArgument)
        );
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        store.add(&mut anchor, &request(1, b"a")).unwrap();
        assert_eq!(
            store.add(&mut anchor, &request(1, b"b")),
            Err(Error::AlreadyExists)
        );
    }

    #[test]
    fn test_add_anchor_failure_leaves_no_entry() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);

        let mut req = request(1, b"material");
        req.flags = KeyFlags::ANCHOR_STORED;

        anchor.fail_next_store();
        assert!(store.add(&mut anchor, &req).is_err());
        assert_eq!(store.count(), 0);
        assert_eq!(anchor.object_count(), 0);
    }

    #[test]
    fn test_revoke_is_monotonic() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        let mut log = LogBuffer::new();

        store.add(&mut anchor, &request(1, b"material")).unwrap();
        store.revoke(&mut anchor, &mut log, 1, 0).unwrap();
        assert!(store.get(1).unwrap().meta.flags.contains(KeyFlags::REVOKED));

        // Revoking again keeps the flag
        store.revoke(&mut anchor, &mut log, 1, 0).unwrap();
        assert!(store.get(1).unwrap().meta.flags.contains(KeyFlags::REVOKED));
    }

    #[test]
    fn test_revoke_fail_open_on_anchor_verify() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        let mut log = LogBuffer::new();

        let mut req = request(3, b"anchored");
        req.flags = KeyFlags::ANCHOR_STORED;
        store.add(&mut anchor, &req).unwrap();

        anchor.fail_next_verify();
        store.revoke(&mut anchor, &mut log, 3, 7).unwrap();

        assert!(store.get(3).unwrap().meta.flags.contains(KeyFlags::REVOKED));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_rotate_revokes_old_and_adds_new() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        let mut log = LogBuffer::new();

        store.add(&mut anchor, &request(5, b"old material")).unwrap();
        store
            .rotate(&mut anchor, &mut log, 5, &request(6, b"new material"), 0)
            .unwrap();

        assert!(store.get(5).unwrap().meta.flags.contains(KeyFlags::REVOKED));
        let fresh = store.get(6).unwrap();
        assert!(!fresh.meta.flags.contains(KeyFlags::REVOKED));
        assert_eq!(
            fresh.meta.fingerprint,
            Sha3_256::hash(b"new material").into_bytes()
        );
    }

    #[test]
    fn test_rotate_unknown_old_id() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        let mut log = LogBuffer::new();
        assert_eq!(
            store.rotate(&mut anchor, &mut log, 9, &request(10, b"x"), 0),
            Err(Error::NotFound)
        );
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_list_bounded() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        for id in 0..4 {
            store.add(&mut anchor, &request(id, b"material")).unwrap();
        }

        let mut metas = [store.get(0).unwrap().meta; 2];
        assert_eq!(store.list(&mut metas), 2);

        let mut metas = [store.get(0).unwrap().meta; 8];
        assert_eq!(store.list(&mut metas), 4);
    }

    #[test]
    fn test_remove_deletes_anchor_object() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);

        let mut req = request(2, b"anchored");
        req.flags = KeyFlags::ANCHOR_STORED;
        store.add(&mut anchor, &req).unwrap();
        assert_eq!(anchor.object_count(), 1);

        store.remove(&mut anchor, 2).unwrap();
        assert_eq!(anchor.object_count(), 0);
        assert_eq!(store.get(2).unwrap_err(), Error::NotFound);
    }

    #[test]
    fn test_fingerprint_stable_across_revoke() {
        let mut store = KeyStore::new();
        let mut anchor = SoftAnchor::with_seed(1);
        let mut log = LogBuffer::new();

        store.add(&mut anchor, &request(1, b"stable material")).unwrap();
        let before = store.get(1).unwrap().meta.fingerprint;

        store.revoke(&mut anchor, &mut log, 1, 0).unwrap();
        let after = store.get(1).unwrap().meta.fingerprint;

        assert_eq!(before, after);
    }
}
