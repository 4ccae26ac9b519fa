//! Merkle tree over an ordered allowlist.
//!
//! Levels are built bottom-up by pairing adjacent nodes left to right. When a
//! level has an odd length its last node is paired with itself, and in the
//! proof that duplicate is reported as a right-hand sibling. Because
//! `hash_pair(a, a)` is the same in either order, flipping the side of such a
//! padded step still verifies; every other step is bound to its side. Input
//! order is part of the commitment: permuting the list changes the root.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::address::Address;
use crate::common::{hex_hash, hex_hash_opt};
use crate::error::{AllowlistError, Result};
use crate::hash::{hash_pair, leaf_hash, Hash};
use crate::proof::{Proof, ProofStep, Side};

/// A canonical address together with its leaf hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub address: Address,
    pub hash: Hash,
}

impl Leaf {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            hash: leaf_hash(&address),
        }
    }
}

/// Immutable Merkle commitment to one allowlist snapshot.
///
/// `levels[0]` holds the leaf hashes and the last level holds only the root.
/// The parent at `(l + 1, i)` covers `(l, 2i)` and `(l, 2i + 1)`, or `(l, 2i)`
/// twice when `2i` is the last node of an odd level.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
    leaves: Vec<Leaf>,
    index: HashMap<Address, usize>,
}

impl MerkleTree {
    /// Canonicalizes `addresses` in order and builds the tree.
    ///
    /// # Errors
    /// Fails with [`AllowlistError::InvalidAddressFormat`] on the first malformed
    /// entry, or [`AllowlistError::EmptyAllowlist`] if the list is empty.
    pub fn build<S: AsRef<str>>(addresses: &[S]) -> Result<Self> {
        let leaves = addresses
            .iter()
            .map(|raw| Address::parse(raw.as_ref()).map(Leaf::new))
            .collect::<Result<Vec<_>>>()?;
        Self::from_leaves(leaves)
    }

    /// Builds the tree from already-hashed leaves, preserving their order.
    pub fn from_leaves(leaves: Vec<Leaf>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AllowlistError::EmptyAllowlist);
        }

        let mut index = HashMap::with_capacity(leaves.len());
        for (position, leaf) in leaves.iter().enumerate() {
            match index.entry(leaf.address) {
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
                Entry::Occupied(first) => {
                    warn!(
                        address = %leaf.address,
                        first = *first.get(),
                        duplicate = position,
                        "duplicate allowlist entry; proofs use the first occurrence"
                    );
                }
            }
        }

        let levels = build_levels(leaves.iter().map(|leaf| leaf.hash).collect());
        let tree = Self {
            levels,
            leaves,
            index,
        };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            root = %crate::common::hex_encode(tree.root()),
            "built allowlist Merkle tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> Hash {
        // `from_leaves` guarantees at least one level ending in a single root.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of steps in every proof produced by this tree.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Leaves in allowlist order.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// All levels, leaves first, root last.
    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }

    /// Position of `address` in the allowlist (first occurrence).
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    /// Canonicalizes `address` and returns its membership result.
    ///
    /// # Errors
    /// Only [`AllowlistError::InvalidAddressFormat`]; absence is
    /// [`Membership::NotEligible`].
    pub fn prove_membership(&self, address: &str) -> Result<Membership> {
        let address = Address::parse(address)?;
        Ok(self.prove(&address))
    }

    /// Membership result for an already canonical address.
    pub fn prove(&self, address: &Address) -> Membership {
        let Some(leaf_index) = self.index_of(address) else {
            debug!(%address, "address not in allowlist");
            return Membership::NotEligible;
        };
        let proof = self.path(leaf_index);
        debug!(%address, leaf_index, steps = proof.len(), "generated membership proof");
        Membership::Eligible {
            leaf_index,
            leaf: self.leaves[leaf_index].hash,
            proof,
        }
    }

    /// Proof for the leaf at `leaf_index`, or `None` if out of bounds.
    pub fn proof_at(&self, leaf_index: usize) -> Option<Proof> {
        (leaf_index < self.leaf_count()).then(|| self.path(leaf_index))
    }

    fn path(&self, leaf_index: usize) -> Proof {
        let mut steps = Vec::with_capacity(self.depth());
        let mut current_index = leaf_index;

        for level in &self.levels[..self.depth()] {
            let step = if current_index % 2 == 1 {
                ProofStep::new(level[current_index - 1], Side::Left)
            } else {
                // Padded level: the partner is the node itself.
                let sibling = level
                    .get(current_index + 1)
                    .copied()
                    .unwrap_or(level[current_index]);
                ProofStep::new(sibling, Side::Right)
            };
            steps.push(step);
            current_index /= 2;
        }

        Proof::new(steps)
    }
}

fn build_levels(leaves: Vec<Hash>) -> Vec<Vec<Hash>> {
    let mut levels = vec![leaves];

    while let Some(level) = levels.last().filter(|level| level.len() > 1) {
        let next_level: Vec<Hash> = level
            .chunks(2)
            .map(|chunk| {
                let left = &chunk[0];
                let right = chunk.get(1).unwrap_or(left);
                hash_pair(left, right)
            })
            .collect();
        levels.push(next_level);
    }

    levels
}

/// Outcome of a membership query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Eligible {
        leaf_index: usize,
        leaf: Hash,
        proof: Proof,
    },
    NotEligible,
}

impl Membership {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }

    /// The proof, or an empty one for [`Membership::NotEligible`].
    pub fn proof(&self) -> &[ProofStep] {
        match self {
            Self::Eligible { proof, .. } => proof.steps(),
            Self::NotEligible => &[],
        }
    }

    pub fn leaf(&self) -> Option<Hash> {
        match self {
            Self::Eligible { leaf, .. } => Some(*leaf),
            Self::NotEligible => None,
        }
    }

    pub fn into_proof(self) -> Option<Proof> {
        match self {
            Self::Eligible { proof, .. } => Some(proof),
            Self::NotEligible => None,
        }
    }
}

/// JSON form of a membership answer, handed to the minting front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipReport {
    pub address: Address,
    pub eligible: bool,
    #[serde(with = "hex_hash")]
    pub root: Hash,
    #[serde(default, with = "hex_hash_opt", skip_serializing_if = "Option::is_none")]
    pub leaf: Option<Hash>,
    /// Bit `k` gives the side of `siblings[k]`: set means left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_index: Option<usize>,
    #[serde(default)]
    pub proof: Proof,
    /// Bare hex siblings; only checkable together with `leaf_index`.
    #[serde(default)]
    pub siblings: Vec<String>,
}

impl MembershipReport {
    pub fn new(tree: &MerkleTree, address: Address, membership: &Membership) -> Self {
        match membership {
            Membership::Eligible {
                leaf_index,
                leaf,
                proof,
            } => Self {
                address,
                eligible: true,
                root: tree.root(),
                leaf: Some(*leaf),
                leaf_index: Some(*leaf_index),
                siblings: proof
                    .siblings()
                    .iter()
                    .map(crate::common::hex_encode)
                    .collect(),
                proof: proof.clone(),
            },
            Membership::NotEligible => Self {
                address,
                eligible: false,
                root: tree.root(),
                leaf: None,
                leaf_index: None,
                proof: Proof::default(),
                siblings: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::{verify, verify_indexed};

    fn addr_str(i: u8) -> String {
        format!("0x{}", hex::encode([i + 1; 20]))
    }

    fn list(n: u8) -> Vec<String> {
        (0..n).map(addr_str).collect()
    }

    fn h(i: u8) -> Hash {
        leaf_hash(&Address::from_bytes([i + 1; 20]))
    }

    #[test]
    fn test_empty_allowlist() {
        let empty: Vec<String> = vec![];
        assert!(matches!(
            MerkleTree::build(&empty),
            Err(AllowlistError::EmptyAllowlist)
        ));
    }

    #[test]
    fn test_invalid_entry_fails_build() {
        let err = MerkleTree::build(&["0x1234"]).unwrap_err();
        assert!(matches!(err, AllowlistError::InvalidAddressFormat { .. }));
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = MerkleTree::build(&list(1)).unwrap();
        assert_eq!(tree.root(), h(0));
        assert_eq!(tree.depth(), 0);
        let membership = tree.prove_membership(&addr_str(0)).unwrap();
        assert!(membership.is_eligible());
        assert!(membership.proof().is_empty());
    }

    #[test]
    fn test_two_leaf_tree() {
        let tree = MerkleTree::build(&list(2)).unwrap();
        assert_eq!(tree.root(), hash_pair(&h(0), &h(1)));
        assert_eq!(
            tree.proof_at(0).unwrap().steps(),
            &[ProofStep::new(h(1), Side::Right)]
        );
        assert_eq!(
            tree.proof_at(1).unwrap().steps(),
            &[ProofStep::new(h(0), Side::Left)]
        );
    }

    #[test]
    fn test_three_leaf_tree_pads_last_node() {
        let tree = MerkleTree::build(&list(3)).unwrap();
        let p1 = hash_pair(&h(0), &h(1));
        let p2 = hash_pair(&h(2), &h(2));
        assert_eq!(tree.root(), hash_pair(&p1, &p2));

        assert_eq!(
            tree.proof_at(0).unwrap().steps(),
            &[
                ProofStep::new(h(1), Side::Right),
                ProofStep::new(p2, Side::Right)
            ]
        );
        assert_eq!(
            tree.proof_at(1).unwrap().steps(),
            &[
                ProofStep::new(h(0), Side::Left),
                ProofStep::new(p2, Side::Right)
            ]
        );
        assert_eq!(
            tree.proof_at(2).unwrap().steps(),
            &[
                ProofStep::new(h(2), Side::Right),
                ProofStep::new(p1, Side::Left)
            ]
        );
    }

    #[test]
    fn test_five_leaf_tree() {
        let tree = MerkleTree::build(&list(5)).unwrap();
        let a = hash_pair(&h(0), &h(1));
        let b = hash_pair(&h(2), &h(3));
        let c = hash_pair(&h(4), &h(4));
        let ab = hash_pair(&a, &b);
        let cc = hash_pair(&c, &c);
        assert_eq!(tree.root(), hash_pair(&ab, &cc));
        assert_eq!(tree.depth(), 3);

        assert_eq!(
            tree.proof_at(4).unwrap().steps(),
            &[
                ProofStep::new(h(4), Side::Right),
                ProofStep::new(c, Side::Right),
                ProofStep::new(ab, Side::Left)
            ]
        );
        assert_eq!(
            tree.proof_at(3).unwrap().steps(),
            &[
                ProofStep::new(h(2), Side::Left),
                ProofStep::new(a, Side::Left),
                ProofStep::new(cc, Side::Right)
            ]
        );
    }

    #[test]
    fn test_every_leaf_verifies() {
        for n in 1..=33u8 {
            let tree = MerkleTree::build(&list(n)).unwrap();
            for i in 0..n {
                let membership = tree.prove_membership(&addr_str(i)).unwrap();
                let Membership::Eligible {
                    leaf_index, proof, ..
                } = membership
                else {
                    panic!("leaf {i} of {n} not found");
                };
                assert_eq!(leaf_index, i as usize);
                assert_eq!(proof.len(), tree.depth());
                assert!(verify(h(i), &proof, &tree.root()), "leaf {i} of {n}");
            }
        }
    }

    #[test]
    fn test_index_bits_agree_with_proof_sides() {
        for n in 1..=33u8 {
            let tree = MerkleTree::build(&list(n)).unwrap();
            for i in 0..n {
                let index = i as usize;
                let proof = tree.proof_at(index).unwrap();
                for (level, step) in proof.steps().iter().enumerate() {
                    let expected = if (index >> level) & 1 == 1 {
                        Side::Left
                    } else {
                        Side::Right
                    };
                    assert_eq!(step.side, expected, "leaf {i} of {n}, level {level}");
                }
                assert!(verify_indexed(h(i), &proof.siblings(), index, &tree.root()));
                assert_eq!(
                    verify(h(i), &proof, &tree.root()),
                    verify_indexed(h(i), &proof.siblings(), index, &tree.root())
                );
                if n > 1 {
                    let wrong = (index + 1) % n as usize;
                    if wrong != index {
                        assert!(!verify_indexed(h(i), &proof.siblings(), wrong, &tree.root()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_flipping_padded_side_still_verifies() {
        let tree = MerkleTree::build(&list(3)).unwrap();
        let proof = tree.proof_at(2).unwrap();
        let mut steps = proof.steps().to_vec();
        assert_eq!(steps[0].sibling, h(2));
        steps[0].side = Side::Left;
        assert!(verify(h(2), &Proof::new(steps.clone()), &tree.root()));

        steps[0].side = Side::Right;
        steps[1].side = Side::Right;
        assert!(!verify(h(2), &Proof::new(steps), &tree.root()));
    }

    #[test]
    fn test_not_eligible_has_empty_proof() {
        let tree = MerkleTree::build(&list(4)).unwrap();
        let membership = tree.prove_membership(&addr_str(9)).unwrap();
        assert_eq!(membership, Membership::NotEligible);
        assert!(membership.proof().is_empty());
        assert!(membership.leaf().is_none());
    }

    #[test]
    fn test_prove_membership_rejects_malformed_address() {
        let tree = MerkleTree::build(&list(2)).unwrap();
        assert!(matches!(
            tree.prove_membership("not-an-address"),
            Err(AllowlistError::InvalidAddressFormat { .. })
        ));
    }

    #[test]
    fn test_duplicate_entry_indexes_first_occurrence() {
        let entries = vec![addr_str(0), addr_str(1), addr_str(0)];
        let tree = MerkleTree::build(&entries).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.index_of(&Address::from_bytes([1; 20])), Some(0));
        let proof = tree.proof_at(2).unwrap();
        assert!(verify(h(0), &proof, &tree.root()));
    }

    #[test]
    fn test_proof_at_out_of_bounds() {
        let tree = MerkleTree::build(&list(3)).unwrap();
        assert!(tree.proof_at(3).is_none());
    }

    #[test]
    fn test_report_for_eligible_and_not_eligible() {
        let tree = MerkleTree::build(&list(3)).unwrap();
        let member = Address::parse(&addr_str(1)).unwrap();
        let report = MembershipReport::new(&tree, member, &tree.prove(&member));
        assert!(report.eligible);
        assert_eq!(report.leaf_index, Some(1));
        assert_eq!(report.siblings.len(), 2);
        assert_eq!(report.siblings[0], crate::common::hex_encode(h(0)));

        let stranger = Address::from_bytes([0xee; 20]);
        let report = MembershipReport::new(&tree, stranger, &tree.prove(&stranger));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["eligible"], false);
        assert!(json.get("leaf").is_none());
        assert_eq!(json["proof"].as_array().unwrap().len(), 0);
    }
}
