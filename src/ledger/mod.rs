//! Ledger: identities, accounts, and the proposals plugins make about them

mod accounts;
mod identity;
mod proposal;

pub use accounts::{Account, Ledger, LedgerAction, LedgerError, LedgerEvent, LedgerResult};
pub use identity::{
    identity_address, identity_prefix, Alias, Identity, IdentityId, IdentityName, IdentityType,
    MAX_NAME_LENGTH,
};
pub use proposal::{ensure_identity_exists, IdentityProposal};
