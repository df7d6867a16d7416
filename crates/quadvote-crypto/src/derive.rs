//! Deterministic account address derivation.
//!
//! Every governance record lives at an address computed from what identifies
//! it, so looking a record up and proving it is unique are the same operation:
//!
//! | kind     | components                          |
//! |----------|-------------------------------------|
//! | DAO      | name bytes, creator identity        |
//! | Proposal | DAO address, sequence index (u64 LE)|
//! | Vote     | voter identity, proposal address    |
//!
//! `address = blake3(domain ‖ namespace ‖ field(seed) ‖ field(c0) ‖ field(c1) ...)`
//! where `field(x)` is `len(x) as u64 LE ‖ x`.

use crate::hash::{hash_with_domain, IncrementalHasher};
use quadvote_types::{Address, Hash};

/// Domain tag mixed into every derived address.
pub const DERIVE_DOMAIN: &[u8] = b"quadvote/account/v1";

/// Domain tag for turning a ledger id into a namespace.
const NAMESPACE_DOMAIN: &str = "quadvote/namespace/v1";

/// Ledger id used when none is configured.
pub const DEFAULT_LEDGER_ID: &str = "quadvote";

/// Kind of record stored at a derived address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Dao,
    Proposal,
    Vote,
}

impl AccountKind {
    /// Seed prefix that namespaces this kind's addresses.
    pub const fn seed(&self) -> &'static [u8] {
        match self {
            AccountKind::Dao => b"dao",
            AccountKind::Proposal => b"proposal",
            AccountKind::Vote => b"vote",
        }
    }

    /// One-byte tag written in front of every stored record of this kind.
    pub const fn tag(&self) -> u8 {
        match self {
            AccountKind::Dao => 1,
            AccountKind::Proposal => 2,
            AccountKind::Vote => 3,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            AccountKind::Dao => "dao",
            AccountKind::Proposal => "proposal",
            AccountKind::Vote => "vote",
        }
    }
}

/// Derives record addresses within one ledger namespace.
///
/// Two derivers built from different ledger ids never produce the same
/// address for the same inputs, so several ledgers can share one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountDeriver {
    namespace: Hash,
}

impl AccountDeriver {
    pub fn new(ledger_id: &str) -> Self {
        Self {
            namespace: hash_with_domain(ledger_id.as_bytes(), NAMESPACE_DOMAIN),
        }
    }

    pub fn namespace(&self) -> Hash {
        self.namespace
    }

    /// Derive the address for `kind` from an ordered list of components.
    pub fn derive(&self, kind: AccountKind, components: &[&[u8]]) -> Address {
        let mut hasher = IncrementalHasher::new();
        hasher.update(DERIVE_DOMAIN);
        hasher.update(self.namespace.as_bytes());
        hasher.update_field(kind.seed());
        for component in components {
            hasher.update_field(component);
        }
        Address::from_hash(hasher.finalize())
    }

    pub fn dao_address(&self, name: &str, creator: &Address) -> Address {
        self.derive(AccountKind::Dao, &[name.as_bytes(), creator.as_bytes()])
    }

    pub fn proposal_address(&self, dao: &Address, sequence_index: u64) -> Address {
        self.derive(
            AccountKind::Proposal,
            &[dao.as_bytes(), &sequence_index.to_le_bytes()],
        )
    }

    pub fn vote_address(&self, voter: &Address, proposal: &Address) -> Address {
        self.derive(AccountKind::Vote, &[voter.as_bytes(), proposal.as_bytes()])
    }
}

impl Default for AccountDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_ID)
    }
}
