//! Process-wide handle to the active allowlist snapshot.
//!
//! Readers clone the current `Arc<MerkleTree>` and work on it without holding
//! the lock. Publishing swaps the `Arc`; readers that already hold the previous
//! snapshot keep using it until they drop it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;
use tracing::{error, info};

use crate::common::hex_encode;
use crate::error::{AllowlistError, Result};
use crate::hash::Hash;
use crate::tree::{Membership, MerkleTree};

#[derive(Debug, Default)]
pub struct AllowlistRegistry {
    current: RwLock<Option<Arc<MerkleTree>>>,
}

impl AllowlistRegistry {
    /// An empty registry; queries fail with [`AllowlistError::TreeNotBuilt`]
    /// until a tree is published.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(tree: MerkleTree) -> Self {
        let registry = Self::new();
        registry.publish(tree);
        registry
    }

    /// Replaces the active snapshot and returns the one it superseded.
    pub fn publish(&self, tree: MerkleTree) -> Option<Arc<MerkleTree>> {
        let tree = Arc::new(tree);
        info!(
            leaves = tree.leaf_count(),
            root = %hex_encode(tree.root()),
            "publishing allowlist snapshot"
        );
        self.current.write().replace(tree)
    }

    /// Builds a tree from `addresses` and publishes it.
    ///
    /// On error the previous snapshot stays active.
    pub fn reload<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Hash> {
        let tree = MerkleTree::build(addresses)?;
        let root = tree.root();
        self.publish(tree);
        Ok(root)
    }

    /// Builds and publishes on a background thread.
    pub fn spawn_reload(self: &Arc<Self>, addresses: Vec<String>) -> JoinHandle<Result<Hash>> {
        let registry = Arc::clone(self);
        thread::spawn(move || {
            registry.reload(&addresses).inspect_err(|e| {
                error!("background allowlist reload failed: {e}");
            })
        })
    }

    /// The active snapshot.
    pub fn current(&self) -> Result<Arc<MerkleTree>> {
        self.current
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(AllowlistError::TreeNotBuilt)
    }

    pub fn is_built(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn root(&self) -> Result<Hash> {
        Ok(self.current()?.root())
    }

    pub fn prove_membership(&self, address: &str) -> Result<Membership> {
        self.current()?.prove_membership(address)
    }
}
