//! Merkle commitment over a presale allowlist.
//!
//! The allowlist is an ordered list of Ethereum addresses. [`MerkleTree::build`]
//! commits to it with a single root, [`MerkleTree::prove_membership`] produces
//! the sibling path for one address, and [`verify`] checks a path against a
//! root without the rest of the list.
//!
//! The hashing rules are fixed to match the mint contract:
//! leaf = `keccak256(address)`, parent = `keccak256(left ++ right)`, and the
//! last node of an odd level is paired with itself.

#![forbid(unsafe_code)]

pub mod address;
pub mod common;
pub mod error;
pub mod hash;
pub mod proof;
pub mod registry;
pub mod source;
pub mod tree;

pub use address::Address;
pub use common::{hex_encode, parse_hash, write_file_atomic};
pub use error::{AllowlistError, Result};
pub use hash::{hash_pair, leaf_hash, Hash};
pub use proof::{
    verify, verify_address, verify_indexed, verify_strict, Claim, Proof, ProofStep, Side,
};
pub use registry::AllowlistRegistry;
pub use source::{load_addresses, parse_addresses};
pub use tree::{Leaf, Membership, MembershipReport, MerkleTree};
