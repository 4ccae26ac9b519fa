//! Leaf and node hashing shared with the on-chain verifier.
//!
//! Both functions are part of the commitment protocol: the leaf is
//! `keccak256(abi.encodePacked(account))` and every parent is
//! `keccak256(abi.encodePacked(left, right))` with the pair kept in tree order.
//! A verifier must therefore know each sibling's side, either from the proof
//! steps or from the leaf index bits. Sorted-pair verifiers (OpenZeppelin
//! `MerkleProof.verify`) do not accept these proofs. Any change here makes
//! every published root unverifiable.

use sha3::{Digest, Keccak256};

use crate::address::Address;

pub const HASH_LEN: usize = 32;

pub type Hash = [u8; HASH_LEN];

/// Computes the Merkle leaf for an address: Keccak256 over its 20 raw bytes.
pub fn leaf_hash(address: &Address) -> Hash {
    Keccak256::digest(address.as_bytes()).into()
}

/// Computes a Keccak256 hash of two 32-byte values concatenated, left first.
///
/// Pairs are never sorted; the caller decides which side each input is on.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_input_vector() {
        let empty: Hash = Keccak256::digest(b"").into();
        assert_eq!(
            hex::encode(empty),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_leaf_hash_covers_only_address_bytes() {
        let address = Address::from_bytes([7u8; 20]);
        let expected: Hash = Keccak256::digest([7u8; 20]).into();
        assert_eq!(leaf_hash(&address), expected);

        let mut padded = [0u8; 32];
        padded[12..].copy_from_slice(&[7u8; 20]);
        let padded_hash: Hash = Keccak256::digest(padded).into();
        assert_ne!(leaf_hash(&address), padded_hash);
    }

    #[test]
    fn test_hash_pair_is_concatenation() {
        let left = [1u8; 32];
        let right = [2u8; 32];
        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(&left);
        concat[32..].copy_from_slice(&right);
        let expected: Hash = Keccak256::digest(concat).into();
        assert_eq!(hash_pair(&left, &right), expected);
    }

    #[test]
    fn test_hash_pair_is_not_commutative() {
        let left = [1u8; 32];
        let right = [2u8; 32];
        assert_ne!(hash_pair(&left, &right), hash_pair(&right, &left));
    }
}
