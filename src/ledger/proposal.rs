//! Identity proposals: plugin suggestions folded into the ledger

use super::accounts::{Ledger, LedgerResult};
use super::identity::{Alias, IdentityName, IdentityType, MAX_NAME_LENGTH};
use serde::{Deserialize, Serialize};

/// A plugin's suggestion that an identity should exist.
///
/// The alias address is what makes proposals equivalent: two proposals with
/// the same alias address describe the same participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProposal {
    /// Preferred name; coerced into a valid identity name when applied
    pub name: String,
    /// Name of the proposing plugin, used to disambiguate taken names
    pub plugin_name: String,
    pub subtype: IdentityType,
    pub alias: Alias,
}

/// Ensure the identity described by `proposal` exists in `ledger`.
///
/// Idempotent: if any account already owns the alias address the ledger is
/// left unchanged. Otherwise a new identity is created under the first free
/// name among `name`, `name-<plugin>`, `name-<plugin>-1`, `name-<plugin>-2`,
/// ..., and the alias is attached to it.
pub fn ensure_identity_exists(ledger: &mut Ledger, proposal: &IdentityProposal) -> LedgerResult<()> {
    if ledger.account_by_address(&proposal.alias.address).is_some() {
        return Ok(());
    }
    let name = choose_identity_name(proposal, |n| ledger.name_available(n))?;
    ledger.create_identity_with_alias(proposal.subtype, name, proposal.alias.clone())?;
    Ok(())
}

fn choose_identity_name(
    proposal: &IdentityProposal,
    available: impl Fn(&IdentityName) -> bool,
) -> LedgerResult<IdentityName> {
    let base = IdentityName::coerce(&proposal.name)?;
    if available(&base) {
        return Ok(base);
    }
    let plugin_suffix = format!("-{}", proposal.plugin_name);
    let candidate = with_suffix(base.as_str(), &plugin_suffix)?;
    if available(&candidate) {
        return Ok(candidate);
    }
    let mut i: u64 = 1;
    loop {
        let candidate = with_suffix(base.as_str(), &format!("{}-{}", plugin_suffix, i))?;
        if available(&candidate) {
            return Ok(candidate);
        }
        i += 1;
    }
}

/// Append `suffix`, shortening `base` so the suffix always survives truncation.
fn with_suffix(base: &str, suffix: &str) -> LedgerResult<IdentityName> {
    let suffix: String = IdentityName::coerce(suffix)?.into();
    let room = MAX_NAME_LENGTH.saturating_sub(suffix.chars().count());
    let head: String = base.chars().take(room).collect();
    IdentityName::coerce(&format!("{}{}", head, suffix))
}
