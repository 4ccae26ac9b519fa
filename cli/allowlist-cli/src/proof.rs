//! Inclusion proofs and their verification.
//!
//! Verification needs nothing but the claimed leaf, the proof and the root,
//! which is exactly what the mint contract holds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::Address;
use crate::common::hex_hash;
use crate::error::{AllowlistError, Result};
use crate::hash::{hash_pair, leaf_hash, Hash};

/// Which side of the running hash the sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One level of a proof: the sibling hash and its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    #[serde(with = "hex_hash")]
    pub sibling: Hash,
    pub side: Side,
}

impl ProofStep {
    pub fn new(sibling: Hash, side: Side) -> Self {
        Self { sibling, side }
    }

    /// Combines the running hash with this step's sibling.
    pub fn apply(&self, current: &Hash) -> Hash {
        match self.side {
            Side::Left => hash_pair(&self.sibling, current),
            Side::Right => hash_pair(current, &self.sibling),
        }
    }
}

/// Sibling path from a leaf to the root, read leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof {
    steps: Vec<ProofStep>,
}

impl Proof {
    pub fn new(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Bare sibling hashes, leaf level first.
    ///
    /// Pairs are ordered, so this list alone does not say where each sibling
    /// goes. A consumer also needs the leaf index: the sibling at level `k` is
    /// on the left iff bit `k` of the index is set. See [`verify_indexed`].
    pub fn siblings(&self) -> Vec<Hash> {
        self.steps.iter().map(|step| step.sibling).collect()
    }

    /// Folds the proof over `leaf` and returns the implied root.
    pub fn compute_root(&self, leaf: &Hash) -> Hash {
        self.steps
            .iter()
            .fold(*leaf, |current, step| step.apply(&current))
    }
}

/// What a verifier is asked to check: an address it hashes itself, or a
/// leaf hash supplied directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Address(Address),
    /// Must be [`leaf_hash`] of a known address. Leaves and inner nodes share
    /// one hash function, so an inner node with the remainder of its path
    /// also recomputes the root.
    Leaf(Hash),
}

impl Claim {
    pub fn leaf(&self) -> Hash {
        match self {
            Self::Address(address) => leaf_hash(address),
            Self::Leaf(hash) => *hash,
        }
    }
}

impl From<Address> for Claim {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<Hash> for Claim {
    fn from(hash: Hash) -> Self {
        Self::Leaf(hash)
    }
}

/// Recomputes the root from `claim` and `proof` and compares it with `root`.
pub fn verify(claim: impl Into<Claim>, proof: &Proof, root: &Hash) -> bool {
    let leaf = claim.into().leaf();
    let computed = proof.compute_root(&leaf);
    let valid = computed == *root;
    debug!(steps = proof.len(), valid, "verified membership proof");
    valid
}

/// Verifies bare siblings, taking each side from the bits of `leaf_index`.
///
/// This is the shape an on-chain verifier receives: `bytes32[]` plus the
/// leaf position. Bit `k` set means the sibling at level `k` is on the left.
/// Index bits above the proof length must be zero.
pub fn verify_indexed(
    claim: impl Into<Claim>,
    siblings: &[Hash],
    leaf_index: usize,
    root: &Hash,
) -> bool {
    if leaf_index.checked_shr(siblings.len() as u32).unwrap_or(0) != 0 {
        return false;
    }
    let computed = siblings
        .iter()
        .enumerate()
        .fold(claim.into().leaf(), |current, (level, sibling)| {
            if (leaf_index >> level) & 1 == 1 {
                hash_pair(sibling, &current)
            } else {
                hash_pair(&current, sibling)
            }
        });
    computed == *root
}

/// Like [`verify`], but canonicalizes a raw address string first.
///
/// # Errors
/// Returns [`AllowlistError::InvalidAddressFormat`] for a malformed address;
/// a well-formed address with a bad proof yields `Ok(false)`.
pub fn verify_address(address: &str, proof: &Proof, root: &Hash) -> Result<bool> {
    let address = Address::parse(address)?;
    Ok(verify(address, proof, root))
}

/// Like [`verify`], but reports a mismatch as [`AllowlistError::VerificationFailed`].
pub fn verify_strict(claim: impl Into<Claim>, proof: &Proof, root: &Hash) -> Result<()> {
    if verify(claim, proof, root) {
        Ok(())
    } else {
        Err(AllowlistError::VerificationFailed)
    }
}
