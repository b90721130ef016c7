//! Ledger: the event-sourced record of identities and accounts
//!
//! Every mutation is validated, applied, and appended to an event log.
//! The ledger persists as that log and is reconstructed by replaying it.

use super::identity::{identity_prefix, Alias, Identity, IdentityId, IdentityName, IdentityType};
use crate::graph::NodeAddress;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by ledger validation
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid identity name {0:?}: {1}")]
    InvalidName(String, &'static str),

    #[error("identity name already taken: {0}")]
    NameTaken(String),

    #[error("no identity with id {0}")]
    UnknownIdentity(IdentityId),

    #[error("identity {0} already exists")]
    DuplicateIdentity(IdentityId),

    #[error("alias {address} already belongs to identity {owner}")]
    AliasClaimed {
        address: NodeAddress,
        owner: IdentityId,
    },

    #[error("identity address {0} cannot be used as an alias")]
    AliasIsIdentity(NodeAddress),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// A single state change recorded by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerAction {
    CreateIdentity {
        identity: Identity,
    },
    RenameIdentity {
        identity_id: IdentityId,
        new_name: IdentityName,
    },
    AddAlias {
        identity_id: IdentityId,
        alias: Alias,
    },
    ToggleActivation {
        identity_id: IdentityId,
        active: bool,
    },
}

/// A timestamped entry in the ledger's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Epoch millis at which the action was applied
    pub ledger_timestamp: i64,
    pub action: LedgerAction,
}

/// An identity plus the state the ledger manages for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub identity: Identity,
    /// Inactive accounts are tracked but excluded from distributions
    pub active: bool,
}

/// The system of record for identities.
///
/// Accounts iterate in creation order. Names are unique case-insensitively,
/// and every address (identity or alias) belongs to at most one account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LedgerEvent>", into = "Vec<LedgerEvent>")]
pub struct Ledger {
    accounts: Vec<Account>,
    index: HashMap<IdentityId, usize>,
    /// Lowercased name -> identity
    names: HashMap<String, IdentityId>,
    /// Identity and alias addresses -> identity
    addresses: HashMap<NodeAddress, IdentityId>,
    events: Vec<LedgerEvent>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger by replaying an event log.
    pub fn from_events(events: impl IntoIterator<Item = LedgerEvent>) -> LedgerResult<Self> {
        let mut ledger = Ledger::new();
        for event in events {
            ledger.apply(&event.action)?;
            ledger.events.push(event);
        }
        Ok(ledger)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn account(&self, id: IdentityId) -> Option<&Account> {
        self.index.get(&id).map(|&i| &self.accounts[i])
    }

    /// Look up the account owning `address`, as identity address or alias.
    pub fn account_by_address(&self, address: &NodeAddress) -> Option<&Account> {
        self.addresses.get(address).and_then(|id| self.account(*id))
    }

    /// Case-insensitive name lookup
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        self.names
            .get(&name.to_lowercase())
            .and_then(|id| self.account(*id))
    }

    pub fn name_available(&self, name: &IdentityName) -> bool {
        !self.names.contains_key(&name.key())
    }

    pub fn create_identity(
        &mut self,
        subtype: IdentityType,
        name: IdentityName,
    ) -> LedgerResult<IdentityId> {
        let identity = Identity::new(subtype, name);
        let id = identity.id;
        self.record(LedgerAction::CreateIdentity { identity })?;
        Ok(id)
    }

    /// Create an identity that already carries `alias`, as a single event.
    ///
    /// Nothing is recorded if either the name or the alias is rejected.
    pub fn create_identity_with_alias(
        &mut self,
        subtype: IdentityType,
        name: IdentityName,
        alias: Alias,
    ) -> LedgerResult<IdentityId> {
        let mut identity = Identity::new(subtype, name);
        identity.aliases.push(alias);
        let id = identity.id;
        self.record(LedgerAction::CreateIdentity { identity })?;
        Ok(id)
    }

    pub fn rename_identity(&mut self, identity_id: IdentityId, new_name: IdentityName) -> LedgerResult<()> {
        self.record(LedgerAction::RenameIdentity {
            identity_id,
            new_name,
        })
    }

    pub fn add_alias(&mut self, identity_id: IdentityId, alias: Alias) -> LedgerResult<()> {
        self.record(LedgerAction::AddAlias { identity_id, alias })
    }

    pub fn activate(&mut self, identity_id: IdentityId) -> LedgerResult<()> {
        self.record(LedgerAction::ToggleActivation {
            identity_id,
            active: true,
        })
    }

    pub fn deactivate(&mut self, identity_id: IdentityId) -> LedgerResult<()> {
        self.record(LedgerAction::ToggleActivation {
            identity_id,
            active: false,
        })
    }

    /// Apply an action and, if it succeeds, log it.
    fn record(&mut self, action: LedgerAction) -> LedgerResult<()> {
        self.apply(&action)?;
        self.events.push(LedgerEvent {
            ledger_timestamp: Utc::now().timestamp_millis(),
            action,
        });
        Ok(())
    }

    /// Validate and apply an action. Leaves the ledger untouched on error.
    fn apply(&mut self, action: &LedgerAction) -> LedgerResult<()> {
        match action {
            LedgerAction::CreateIdentity { identity } => {
                if self.index.contains_key(&identity.id) {
                    return Err(LedgerError::DuplicateIdentity(identity.id));
                }
                if !self.name_available(&identity.name) {
                    return Err(LedgerError::NameTaken(identity.name.to_string()));
                }
                if let Some(owner) = self.addresses.get(&identity.address) {
                    return Err(LedgerError::AliasClaimed {
                        address: identity.address.clone(),
                        owner: *owner,
                    });
                }
                for alias in &identity.aliases {
                    self.check_alias(alias)?;
                }
                self.names.insert(identity.name.key(), identity.id);
                self.addresses.insert(identity.address.clone(), identity.id);
                for alias in &identity.aliases {
                    self.addresses.insert(alias.address.clone(), identity.id);
                }
                self.index.insert(identity.id, self.accounts.len());
                self.accounts.push(Account {
                    identity: identity.clone(),
                    active: false,
                });
            }
            LedgerAction::RenameIdentity {
                identity_id,
                new_name,
            } => {
                let i = self.position(*identity_id)?;
                let old_key = self.accounts[i].identity.name.key();
                let new_key = new_name.key();
                if new_key != old_key && self.names.contains_key(&new_key) {
                    return Err(LedgerError::NameTaken(new_name.to_string()));
                }
                self.names.remove(&old_key);
                self.names.insert(new_key, *identity_id);
                self.accounts[i].identity.name = new_name.clone();
            }
            LedgerAction::AddAlias { identity_id, alias } => {
                let i = self.position(*identity_id)?;
                self.check_alias(alias)?;
                self.addresses.insert(alias.address.clone(), *identity_id);
                self.accounts[i].identity.aliases.push(alias.clone());
            }
            LedgerAction::ToggleActivation {
                identity_id,
                active,
            } => {
                let i = self.position(*identity_id)?;
                self.accounts[i].active = *active;
            }
        }
        Ok(())
    }

    fn position(&self, id: IdentityId) -> LedgerResult<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(LedgerError::UnknownIdentity(id))
    }

    fn check_alias(&self, alias: &Alias) -> LedgerResult<()> {
        if alias.address.has_prefix(&identity_prefix()) {
            return Err(LedgerError::AliasIsIdentity(alias.address.clone()));
        }
        if let Some(owner) = self.addresses.get(&alias.address) {
            return Err(LedgerError::AliasClaimed {
                address: alias.address.clone(),
                owner: *owner,
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<LedgerEvent>> for Ledger {
    type Error = LedgerError;

    fn try_from(events: Vec<LedgerEvent>) -> LedgerResult<Self> {
        Ledger::from_events(events)
    }
}

impl From<Ledger> for Vec<LedgerEvent> {
    fn from(ledger: Ledger) -> Self {
        ledger.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> IdentityName {
        IdentityName::parse(s).unwrap()
    }

    fn alias(parts: &[&str]) -> Alias {
        Alias::new(NodeAddress::from_parts(parts.iter().copied()).unwrap(), "alias")
    }

    #[test]
    fn create_identity_adds_inactive_account() {
        let mut ledger = Ledger::new();
        let id = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        let account = ledger.account(id).unwrap();
        assert_eq!(account.identity.name.as_str(), "alice");
        assert!(!account.active);
        assert_eq!(ledger.events().len(), 1);
    }

    #[test]
    fn names_unique_case_insensitively() {
        let mut ledger = Ledger::new();
        ledger.create_identity(IdentityType::User, name("Alice")).unwrap();
        let err = ledger.create_identity(IdentityType::User, name("alice")).unwrap_err();
        assert!(matches!(err, LedgerError::NameTaken(_)));
        assert_eq!(ledger.account_count(), 1);
        assert_eq!(ledger.events().len(), 1);
    }

    #[test]
    fn account_by_name_ignores_case() {
        let mut ledger = Ledger::new();
        let id = ledger.create_identity(IdentityType::User, name("Alice")).unwrap();
        assert_eq!(ledger.account_by_name("ALICE").unwrap().identity.id, id);
    }

    #[test]
    fn rename_frees_old_name() {
        let mut ledger = Ledger::new();
        let id = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        ledger.rename_identity(id, name("alicia")).unwrap();
        assert!(ledger.name_available(&name("alice")));
        assert!(!ledger.name_available(&name("alicia")));
        // Changing only the case of one's own name is allowed
        ledger.rename_identity(id, name("Alicia")).unwrap();
    }

    #[test]
    fn rename_to_taken_name_rejected() {
        let mut ledger = Ledger::new();
        let a = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        ledger.create_identity(IdentityType::User, name("bob")).unwrap();
        assert!(matches!(
            ledger.rename_identity(a, name("BOB")).unwrap_err(),
            LedgerError::NameTaken(_)
        ));
    }

    #[test]
    fn alias_lookup_and_conflicts() {
        let mut ledger = Ledger::new();
        let a = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        let b = ledger.create_identity(IdentityType::User, name("bob")).unwrap();
        ledger.add_alias(a, alias(&["forum", "USER", "alice"])).unwrap();

        let addr = NodeAddress::from_parts(["forum", "USER", "alice"]).unwrap();
        assert_eq!(ledger.account_by_address(&addr).unwrap().identity.id, a);

        let err = ledger.add_alias(b, alias(&["forum", "USER", "alice"])).unwrap_err();
        assert!(matches!(err, LedgerError::AliasClaimed { owner, .. } if owner == a));
    }

    #[test]
    fn create_with_alias_is_one_event() {
        let mut ledger = Ledger::new();
        let a = ledger
            .create_identity_with_alias(IdentityType::User, name("alice"), alias(&["forum", "USER", "alice"]))
            .unwrap();
        assert_eq!(ledger.events().len(), 1);
        let addr = NodeAddress::from_parts(["forum", "USER", "alice"]).unwrap();
        assert_eq!(ledger.account_by_address(&addr).unwrap().identity.id, a);

        let err = ledger
            .create_identity_with_alias(IdentityType::User, name("bob"), alias(&["forum", "USER", "alice"]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AliasClaimed { owner, .. } if owner == a));
        assert_eq!(ledger.account_count(), 1);
        assert_eq!(ledger.events().len(), 1);
        assert!(ledger.name_available(&name("bob")));
    }

    #[test]
    fn identity_address_cannot_be_alias() {
        let mut ledger = Ledger::new();
        let a = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        let b = ledger.create_identity(IdentityType::User, name("bob")).unwrap();
        let b_address = ledger.account(b).unwrap().identity.address.clone();
        let err = ledger.add_alias(a, Alias::new(b_address, "bob")).unwrap_err();
        assert!(matches!(err, LedgerError::AliasIsIdentity(_)));
    }

    #[test]
    fn unknown_identity_rejected() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.activate(IdentityId::new()).unwrap_err(),
            LedgerError::UnknownIdentity(_)
        ));
    }

    #[test]
    fn activation_toggles() {
        let mut ledger = Ledger::new();
        let id = ledger.create_identity(IdentityType::Project, name("proj")).unwrap();
        ledger.activate(id).unwrap();
        assert!(ledger.account(id).unwrap().active);
        ledger.deactivate(id).unwrap();
        assert!(!ledger.account(id).unwrap().active);
    }

    #[test]
    fn event_log_replays_to_same_state() {
        let mut ledger = Ledger::new();
        let a = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        ledger.add_alias(a, alias(&["forum", "USER", "alice"])).unwrap();
        ledger.rename_identity(a, name("alicia")).unwrap();
        ledger.activate(a).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: Ledger = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.events(), ledger.events());
        let accounts: Vec<_> = restored.accounts().cloned().collect();
        let expected: Vec<_> = ledger.accounts().cloned().collect();
        assert_eq!(accounts, expected);
    }

    #[test]
    fn invalid_event_log_rejected() {
        let mut ledger = Ledger::new();
        let a = ledger.create_identity(IdentityType::User, name("alice")).unwrap();
        let mut events = ledger.events().to_vec();
        events.push(LedgerEvent {
            ledger_timestamp: 0,
            action: LedgerAction::ToggleActivation {
                identity_id: IdentityId::new(),
                active: true,
            },
        });
        assert!(Ledger::from_events(events).is_err());
        assert!(ledger.account(a).is_some());
    }
}
