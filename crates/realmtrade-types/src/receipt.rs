//! Settlement receipts for the audit trail.
//!
//! Every committed settlement produces a [`SettlementReceipt`] recording
//! which accounts moved in each direction, digest-sealed so a stored receipt
//! can be independently re-verified against its fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, ListingId, UserId};

/// Proof that a settlement transaction committed.
///
/// The digest covers the listing id, both parties, and both transfer sets
/// (in their recorded order), domain-separated from other hashes in the
/// system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// The listing that was settled.
    pub listing_id: ListingId,
    /// The seller who gave up the listed accounts.
    pub seller_id: UserId,
    /// The buyer who paid and received them.
    pub buyer_id: UserId,
    /// Accounts transferred seller → buyer (the listing's account set).
    pub accounts_to_buyer: Vec<AccountId>,
    /// Accounts transferred buyer → seller (the payment set; may be empty).
    pub accounts_to_seller: Vec<AccountId>,
    /// When the transaction committed.
    pub settled_at: DateTime<Utc>,
    /// SHA-256 over the canonical payload.
    pub digest: [u8; 32],
}

impl SettlementReceipt {
    /// Build a receipt and seal it with its digest.
    #[must_use]
    pub fn new(
        listing_id: ListingId,
        seller_id: UserId,
        buyer_id: UserId,
        accounts_to_buyer: Vec<AccountId>,
        accounts_to_seller: Vec<AccountId>,
    ) -> Self {
        let digest = Self::compute_digest(
            listing_id,
            seller_id,
            buyer_id,
            &accounts_to_buyer,
            &accounts_to_seller,
        );
        Self {
            listing_id,
            seller_id,
            buyer_id,
            accounts_to_buyer,
            accounts_to_seller,
            settled_at: Utc::now(),
            digest,
        }
    }

    /// Canonical digest over the settlement payload.
    ///
    /// `SHA-256(domain_sep || listing_id || seller || buyer ||
    ///  n_to_buyer || ids... || n_to_seller || ids...)`
    #[must_use]
    pub fn compute_digest(
        listing_id: ListingId,
        seller_id: UserId,
        buyer_id: UserId,
        accounts_to_buyer: &[AccountId],
        accounts_to_seller: &[AccountId],
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"realmtrade:settlement:v1:");
        hasher.update(listing_id.0.as_bytes());
        hasher.update(seller_id.0.as_bytes());
        hasher.update(buyer_id.0.as_bytes());
        hasher.update((accounts_to_buyer.len() as u64).to_le_bytes());
        for id in accounts_to_buyer {
            hasher.update(id.0.as_bytes());
        }
        hasher.update((accounts_to_seller.len() as u64).to_le_bytes());
        for id in accounts_to_seller {
            hasher.update(id.0.as_bytes());
        }
        hasher.finalize().into()
    }

    /// Re-verify the stored digest against the receipt's fields.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.digest
            == Self::compute_digest(
                self.listing_id,
                self.seller_id,
                self.buyer_id,
                &self.accounts_to_buyer,
                &self.accounts_to_seller,
            )
    }

    /// Hex rendering of the digest for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_receipt() -> SettlementReceipt {
        SettlementReceipt::new(
            ListingId::new(),
            UserId::new(),
            UserId::new(),
            vec![AccountId::new()],
            vec![AccountId::new(), AccountId::new()],
        )
    }

    #[test]
    fn fresh_receipt_verifies() {
        let receipt = make_receipt();
        assert!(receipt.verify());
    }

    #[test]
    fn tampered_receipt_fails_verification() {
        let mut receipt = make_receipt();
        receipt.accounts_to_seller.pop();
        assert!(!receipt.verify());
    }

    #[test]
    fn digest_depends_on_direction() {
        let listing = ListingId::new();
        let seller = UserId::new();
        let buyer = UserId::new();
        let a = AccountId::new();
        let d1 = SettlementReceipt::compute_digest(listing, seller, buyer, &[a], &[]);
        let d2 = SettlementReceipt::compute_digest(listing, seller, buyer, &[], &[a]);
        assert_ne!(d1, d2);
    }

    #[test]
    fn digest_hex_is_64_chars() {
        let receipt = make_receipt();
        assert_eq!(receipt.digest_hex().len(), 64);
    }

    #[test]
    fn serde_roundtrip() {
        let receipt = make_receipt();
        let json = serde_json::to_string(&receipt).unwrap();
        let back: SettlementReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(receipt, back);
        assert!(back.verify());
    }
}
