//! Per-session wallet registry keyed by wallet id.

use std::collections::{BTreeMap, HashMap};
use wallets::WalletSigner;

struct Entry {
    seq: u64,
    wallet: Box<dyn WalletSigner>,
}

/// Owned mapping from wallet id to signer that iterates in registration order.
#[derive(Default)]
pub struct WalletRegistry {
    wallets: HashMap<String, Entry>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the id is taken. Returns whether the wallet was added.
    pub fn insert(&mut self, id: String, wallet: Box<dyn WalletSigner>) -> bool {
        if self.wallets.contains_key(&id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, id.clone());
        self.wallets.insert(id, Entry { seq, wallet });
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Box<dyn WalletSigner>> {
        let entry = self.wallets.remove(id)?;
        self.order.remove(&entry.seq);
        Some(entry.wallet)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.wallets.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn WalletSigner> {
        self.wallets.get(id).map(|entry| entry.wallet.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn WalletSigner>> {
        self.wallets.get_mut(id).map(|entry| &mut entry.wallet)
    }

    /// Wallet ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

impl std::fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
