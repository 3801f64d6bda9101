//! Data model shared by the parser, resolver and engine.

/// Numeric platform account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub u64);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One channel the input file asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredChannel {
    /// Channel name. Trimmed, never empty.
    pub name: String,
    /// Raw user identifiers to invite, in input order. Not deduplicated;
    /// resolution happens later against the roster snapshot.
    pub user_identifiers: Vec<String>,
    /// 1-based line in the source file, used in warning messages.
    pub source_row: u64,
}

/// A community member as seen by the identifier resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub id: AccountId,
    /// Platform username.
    pub name: String,
    /// Server nickname or global display name, when set.
    pub display_name: Option<String>,
    /// Legacy four-digit discriminator. `None` for migrated accounts.
    pub discriminator: Option<u16>,
    pub bot: bool,
}

impl RosterMember {
    /// Canonical zero-padded rendering of the legacy discriminator.
    pub(crate) fn discriminator_str(&self) -> Option<String> {
        self.discriminator.map(|d| format!("{d:04}"))
    }
}

/// Who a permission grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantSubject {
    /// The community-wide everyone role.
    Everyone,
    /// A single account.
    Account(AccountId),
}

/// A per-channel permission grant, platform-neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGrant {
    pub subject: GrantSubject,
    pub read: bool,
    pub send: bool,
}

/// Tally of a reconciliation run. Reported once, at the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Channels created this run.
    pub created: usize,
    /// Channels skipped because the name already existed in the category.
    pub skipped: usize,
    /// Channels whose creation call failed. Never aborts the run.
    pub failed: usize,
    /// Unresolved-identifier warnings, in encounter order.
    pub warnings: Vec<String>,
}
