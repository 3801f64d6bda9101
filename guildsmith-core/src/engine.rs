//! Reconciliation — diffs the desired channel set against a category's
//! existing channels and creates only what is missing.
//!
//! Per-item faults (permission denied, platform call errors, unresolved
//! identifiers) are recorded and the run continues. Setup failures abort
//! before the engine is ever invoked, so the engine itself never fails.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::pace::Pacer;
use crate::resolve;
use crate::types::{
    AccessGrant, AccountId, DesiredChannel, GrantSubject, ReconcileOutcome, RosterMember,
};

/// Why a single creation call failed. Never fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// The service account lacks permission to create the channel.
    #[error("missing permission")]
    Forbidden,
    /// The platform rejected or failed the request.
    #[error("platform error: {message}")]
    Http { message: String },
    /// Anything else (transport, serialization, ...).
    #[error("{message}")]
    Other { message: String },
}

/// The single mutating call the engine issues.
#[async_trait]
pub trait ChannelCreator {
    /// Create a private text channel with the given grants inside the
    /// target category.
    async fn create_channel(&self, name: &str, grants: &[AccessGrant])
        -> Result<(), CreateError>;
}

/// Reconciliation context: the creation boundary, the service account that
/// keeps read access to every channel it creates, and the pacer.
pub struct Reconciler<C: ChannelCreator> {
    creator: C,
    service_account: AccountId,
    pacer: Pacer,
}

impl<C: ChannelCreator> Reconciler<C> {
    pub fn new(creator: C, service_account: AccountId, pacer: Pacer) -> Self {
        Self {
            creator,
            service_account,
            pacer,
        }
    }

    /// Drive the desired set to completion, in input order.
    ///
    /// `existing_names` is the snapshot of channel names already present in
    /// the category. Names created during the run join the set, so a later
    /// duplicate row is a skip, not a second create.
    pub async fn reconcile(
        &self,
        desired: &[DesiredChannel],
        existing_names: impl IntoIterator<Item = String>,
        roster: &[RosterMember],
    ) -> ReconcileOutcome {
        let mut existing: HashSet<String> = existing_names.into_iter().collect();
        let mut outcome = ReconcileOutcome::default();

        for channel in desired {
            if existing.contains(&channel.name) {
                info!(channel = %channel.name, "already exists, skipping");
                outcome.skipped += 1;
                continue;
            }

            let grants = self.build_grants(channel, roster, &mut outcome);

            match self.creator.create_channel(&channel.name, &grants).await {
                Ok(()) => {
                    info!(channel = %channel.name, "created private channel");
                    existing.insert(channel.name.clone());
                    outcome.created += 1;
                    self.pacer.pause().await;
                }
                Err(CreateError::Forbidden) => {
                    error!(channel = %channel.name, "no permission to create channel");
                    outcome.failed += 1;
                }
                Err(e) => {
                    error!(channel = %channel.name, error = %e, "failed to create channel");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    /// Base policy plus one read+send grant per resolved identifier.
    ///
    /// An identifier that resolves to nobody becomes a warning; the channel
    /// is still created with whatever grants did resolve.
    fn build_grants(
        &self,
        channel: &DesiredChannel,
        roster: &[RosterMember],
        outcome: &mut ReconcileOutcome,
    ) -> Vec<AccessGrant> {
        let mut grants = vec![
            AccessGrant {
                subject: GrantSubject::Everyone,
                read: false,
                send: false,
            },
            AccessGrant {
                subject: GrantSubject::Account(self.service_account),
                read: true,
                send: false,
            },
        ];

        for identifier in &channel.user_identifiers {
            match resolve::resolve(identifier, roster) {
                Some(member) => {
                    info!(user = %member.name, channel = %channel.name, "invited");
                    grants.push(AccessGrant {
                        subject: GrantSubject::Account(member.id),
                        read: true,
                        send: true,
                    });
                }
                None => {
                    warn!(identifier = %identifier, channel = %channel.name, "could not resolve user");
                    outcome.warnings.push(format!(
                        "Row {}: Could not find user '{}' for channel '{}'",
                        channel.source_row, identifier, channel.name
                    ));
                }
            }
        }

        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records creations; fails by name on demand.
    #[derive(Default)]
    struct FakeCreator {
        created: Mutex<Vec<(String, Vec<AccessGrant>)>>,
        failures: HashMap<String, &'static str>,
    }

    impl FakeCreator {
        fn failing(name: &str, kind: &'static str) -> Self {
            let mut failures = HashMap::new();
            failures.insert(name.to_string(), kind);
            Self {
                failures,
                ..Self::default()
            }
        }

        fn created_names(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChannelCreator for FakeCreator {
        async fn create_channel(
            &self,
            name: &str,
            grants: &[AccessGrant],
        ) -> Result<(), CreateError> {
            match self.failures.get(name) {
                Some(&"forbidden") => Err(CreateError::Forbidden),
                Some(kind) => Err(CreateError::Http {
                    message: (*kind).to_string(),
                }),
                None => {
                    self.created
                        .lock()
                        .unwrap()
                        .push((name.to_string(), grants.to_vec()));
                    Ok(())
                }
            }
        }
    }

    fn desired(name: &str, identifiers: &[&str], row: u64) -> DesiredChannel {
        DesiredChannel {
            name: name.to_string(),
            user_identifiers: identifiers.iter().map(|s| s.to_string()).collect(),
            source_row: row,
        }
    }

    fn member(id: u64, name: &str) -> RosterMember {
        RosterMember {
            id: AccountId(id),
            name: name.to_string(),
            display_name: None,
            discriminator: None,
            bot: false,
        }
    }

    fn reconciler(creator: FakeCreator) -> Reconciler<FakeCreator> {
        Reconciler::new(creator, AccountId(1), Pacer::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn creates_in_input_order() {
        let engine = reconciler(FakeCreator::default());
        let desired = [
            desired("alpha", &[], 1),
            desired("bravo", &[], 2),
            desired("charlie", &[], 3),
        ];
        let outcome = engine.reconcile(&desired, Vec::new(), &[]).await;
        assert_eq!(outcome.created, 3);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(
            engine.creator.created_names(),
            vec!["alpha", "bravo", "charlie"]
        );
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let engine = reconciler(FakeCreator::default());
        let desired = [desired("alpha", &[], 1), desired("bravo", &[], 2)];

        let first = engine.reconcile(&desired, Vec::new(), &[]).await;
        assert_eq!(first.created, 2);

        let second = engine
            .reconcile(&desired, engine.creator.created_names(), &[])
            .await;
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 2);
        assert!(second.warnings.is_empty());
    }

    #[tokio::test]
    async fn skip_is_exact_and_case_sensitive() {
        let engine = reconciler(FakeCreator::default());
        let desired = [desired("general", &[], 1), desired("General", &[], 2)];
        let outcome = engine
            .reconcile(&desired, vec!["general".to_string()], &[])
            .await;
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.created, 1);
        assert_eq!(engine.creator.created_names(), vec!["General"]);
    }

    #[tokio::test]
    async fn duplicate_rows_in_one_run_create_once() {
        let engine = reconciler(FakeCreator::default());
        let desired = [desired("alpha", &[], 1), desired("alpha", &[], 2)];
        let outcome = engine.reconcile(&desired, Vec::new(), &[]).await;
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn unresolved_identifier_warns_but_still_creates() {
        let engine = reconciler(FakeCreator::default());
        let desired = [desired("team-x", &["ghost_user"], 3)];
        let outcome = engine.reconcile(&desired, Vec::new(), &[]).await;

        assert_eq!(outcome.created, 1);
        assert_eq!(
            outcome.warnings,
            vec!["Row 3: Could not find user 'ghost_user' for channel 'team-x'"]
        );
        // Only the base grants made it onto the channel.
        let created = engine.creator.created.lock().unwrap();
        assert_eq!(created[0].1.len(), 2);
    }

    #[tokio::test]
    async fn resolved_identifiers_get_read_send_grants() {
        let engine = reconciler(FakeCreator::default());
        let roster = [member(42, "alice")];
        let desired = [desired("team-x", &["alice"], 1)];
        engine.reconcile(&desired, Vec::new(), &roster).await;

        let created = engine.creator.created.lock().unwrap();
        let grants = &created[0].1;
        assert_eq!(grants.len(), 3);
        assert_eq!(
            grants[0],
            AccessGrant {
                subject: GrantSubject::Everyone,
                read: false,
                send: false,
            }
        );
        assert_eq!(
            grants[1],
            AccessGrant {
                subject: GrantSubject::Account(AccountId(1)),
                read: true,
                send: false,
            }
        );
        assert_eq!(
            grants[2],
            AccessGrant {
                subject: GrantSubject::Account(AccountId(42)),
                read: true,
                send: true,
            }
        );
    }

    #[tokio::test]
    async fn skipped_channels_never_resolve_identifiers() {
        let engine = reconciler(FakeCreator::default());
        let desired = [desired("general", &["ghost_user"], 1)];
        let outcome = engine
            .reconcile(&desired, vec!["general".to_string()], &[])
            .await;
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn per_item_failure_does_not_stop_the_run() {
        let engine = reconciler(FakeCreator::failing("bravo", "forbidden"));
        let desired = [
            desired("alpha", &[], 1),
            desired("bravo", &[], 2),
            desired("charlie", &[], 3),
        ];
        let outcome = engine.reconcile(&desired, Vec::new(), &[]).await;
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(engine.creator.created_names(), vec!["alpha", "charlie"]);
    }

    #[tokio::test]
    async fn platform_errors_are_counted_like_permission_errors() {
        let engine = reconciler(FakeCreator::failing("alpha", "rate limited"));
        let desired = [desired("alpha", &[], 1), desired("bravo", &[], 2)];
        let outcome = engine.reconcile(&desired, Vec::new(), &[]).await;
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.failed, 1);
    }
}
