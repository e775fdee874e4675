//! End-to-end scenarios through the public services backed by `MemoryStore`.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use common::{post, start, FakeContent, Harness, QueuedCodes};
use post_verifier::clock::{Clock, FixedClock};
use post_verifier::error::ErrorKind;
use post_verifier::store::MemoryStore;
use post_verifier::workflows::content::{Bullish, ContentError, ContentSource, NormalizedContent};
use post_verifier::workflows::moderation::{ModerationError, ModerationLedger};
use post_verifier::workflows::registration::{
    Account, AccountId, AccountRepository, PendingId, PendingRegistration, RegistrationError,
    RegistrationService, VerificationFailure,
};
use post_verifier::workflows::repository::RepositoryError;
use post_verifier::workflows::sentiment::SentimentLabel;
use post_verifier::workflows::submission::{
    GuildPolicy, PolicyUpdate, PreconditionFailure, Submission, SubmissionError, SubmissionId,
    SubmissionQuery, SubmissionRepository, SubmissionService, SubmissionStatus, TenantId,
    SYSTEM_ACTOR,
};

fn alice() -> AccountId {
    AccountId("account-a".to_string())
}

fn guild() -> TenantId {
    TenantId("guild-1".to_string())
}

async fn registered_harness() -> Harness {
    let harness = Harness::new(&["CMC-AB3DEFGH"]);
    harness.registrations.register(&alice(), "alice").unwrap();
    harness.content.publish(
        "1000",
        post("1000", "alice", "gm, verifying cmc-ab3defgh", start() + Duration::hours(1)),
    );
    harness.clock.set(start() + Duration::hours(2));
    harness.registrations.verify(&alice(), "1000").await.unwrap();
    harness
}

#[tokio::test]
async fn register_then_verify_binds_handle_once() {
    let harness = Harness::new(&["CMC-AB3DEFGH"]);

    let issued = harness.registrations.register(&alice(), "  alice ").unwrap();
    assert_eq!(issued.code, "CMC-AB3DEFGH");
    assert_eq!(issued.handle, "alice");
    assert_eq!(issued.expires_at, start() + Duration::hours(12));

    harness.content.publish(
        "1000",
        post("1000", "alice", "my code is CMC-AB3DEFGH", start() + Duration::hours(1)),
    );
    harness.clock.set(start() + Duration::hours(2));

    let verified = harness.registrations.verify(&alice(), "1000").await.unwrap();
    assert_eq!(verified.handle, "alice");

    let err = harness
        .registrations
        .verify(&alice(), "1000")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::AlreadyRegistered { ref handle } if handle == "alice"));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn registering_twice_returns_the_active_code_unchanged() {
    let harness = Harness::new(&["CMC-AB3DEFGH", "CMC-XYZXYZXY"]);
    harness.registrations.register(&alice(), "alice").unwrap();

    harness.clock.advance(Duration::hours(3));
    let err = harness.registrations.register(&alice(), "alice").unwrap_err();
    match err {
        RegistrationError::ActiveCodeExists { issued } => {
            assert_eq!(issued.code, "CMC-AB3DEFGH");
            assert_eq!(issued.expires_at, start() + Duration::hours(12));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn expired_code_is_replaced_with_a_fresh_one() {
    let harness = Harness::new(&["CMC-AB3DEFGH", "CMC-XYZXYZXY"]);
    harness.registrations.register(&alice(), "alice").unwrap();

    harness.clock.advance(Duration::hours(13));
    let issued = harness.registrations.register(&alice(), "alice").unwrap();
    assert_eq!(issued.code, "CMC-XYZXYZXY");
}

#[tokio::test]
async fn code_collisions_are_retried() {
    let harness = Harness::new(&["CMC-AB3DEFGH", "CMC-AB3DEFGH", "CMC-XYZXYZXY"]);
    harness.registrations.register(&alice(), "alice").unwrap();

    let bob = AccountId("account-b".to_string());
    let issued = harness.registrations.register(&bob, "bob").unwrap();
    assert_eq!(issued.code, "CMC-XYZXYZXY");
}

#[tokio::test]
async fn verification_rejects_posts_made_before_the_code() {
    let harness = Harness::new(&["CMC-AB3DEFGH"]);
    harness.registrations.register(&alice(), "alice").unwrap();
    harness.content.publish(
        "1000",
        post("1000", "alice", "CMC-AB3DEFGH", start() - Duration::minutes(5)),
    );

    let err = harness
        .registrations
        .verify(&alice(), "1000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::VerificationFailed(VerificationFailure::PostPredatesCode)
    ));
}

#[tokio::test]
async fn verification_rejects_foreign_handles_and_missing_codes() {
    let harness = Harness::new(&["CMC-AB3DEFGH"]);
    harness.registrations.register(&alice(), "alice").unwrap();
    let later = start() + Duration::hours(1);
    harness
        .content
        .publish("1", post("1", "mallory", "CMC-AB3DEFGH", later));
    harness
        .content
        .publish("2", post("2", "alice", "no code here", later));

    let err = harness.registrations.verify(&alice(), "1").await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::VerificationFailed(VerificationFailure::HandleMismatch { .. })
    ));

    let err = harness.registrations.verify(&alice(), "2").await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::VerificationFailed(VerificationFailure::CodeNotFound { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn verify_without_a_code_is_rejected() {
    let harness = Harness::new(&[]);
    let err = harness.registrations.verify(&alice(), "1").await.unwrap_err();
    assert!(matches!(err, RegistrationError::NoActiveCode));
}

#[tokio::test]
async fn reset_allows_registering_again() {
    let harness = registered_harness().await;
    harness.registrations.reset(&alice()).unwrap();

    let issued = harness.registrations.register(&alice(), "alice2").unwrap();
    assert_eq!(issued.handle, "alice2");
}

#[tokio::test]
async fn unregistered_accounts_cannot_submit() {
    let harness = Harness::new(&[]);
    let err = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::NotRegistered));
    assert_eq!(harness.content.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn positive_sentiment_above_threshold_is_auto_approved() {
    let harness = registered_harness().await;
    harness.classifier.set(SentimentLabel::Positive, 0.7);
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "to the moon", now - Duration::days(1)));

    let receipt = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap();
    assert_eq!(receipt.status, SubmissionStatus::Approved);
    assert_eq!(receipt.reason, "Auto-approved: bullish=true and positive sentiment.");

    let stored = harness.submissions.get(&guild(), &receipt.submission_id).unwrap();
    assert_eq!(stored.decided_by.as_deref(), Some(SYSTEM_ACTOR));
    assert_eq!(stored.decided_at, Some(now));
    assert_eq!(stored.classification.model, "qwen3-14b");
    assert!(!stored.points.awarded);
}

#[tokio::test]
async fn weak_sentiment_waits_for_review() {
    let harness = registered_harness().await;
    harness.classifier.set(SentimentLabel::Positive, 0.5);
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "maybe up", now - Duration::hours(3)));

    let receipt = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap();
    assert_eq!(receipt.status, SubmissionStatus::PendingReview);
    assert!(receipt.reason.contains("positive"));
    assert!(receipt.reason.contains("0.50"));

    let stored = harness.submissions.get(&guild(), &receipt.submission_id).unwrap();
    assert!(stored.decided_at.is_none());
    assert!(stored.decided_by.is_none());
}

#[tokio::test]
async fn missing_and_false_bullish_flags_route_differently() {
    let harness = registered_harness().await;
    let now = harness.clock.now();

    let mut absent = post("3000", "alice", "hmm", now - Duration::hours(1));
    absent.bullish = Bullish::Absent;
    harness.content.publish("3000", absent);
    let mut bearish = post("3001", "alice", "down only", now - Duration::hours(1));
    bearish.bullish = Bullish::No;
    harness.content.publish("3001", bearish);

    let pending = harness
        .submissions
        .submit(&guild(), &alice(), "3000")
        .await
        .unwrap();
    assert_eq!(pending.status, SubmissionStatus::PendingReview);
    assert_eq!(pending.reason, "Bullish flag missing; requires manual review.");

    let rejected = harness
        .submissions
        .submit(&guild(), &alice(), "3001")
        .await
        .unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.reason, "Bullish flag is false.");
}

#[tokio::test]
async fn stale_posts_are_rejected_before_classification() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "old news", now - Duration::days(8)));

    let err = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Rejected(PreconditionFailure::TooOld { max_days: 7 })
    ));
    assert!(err.to_string().contains("7 days"));
    assert_eq!(harness.classifier.call_count(), 0);
    assert!(harness
        .submissions
        .list(&guild(), SubmissionQuery::default())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn posts_by_another_handle_are_rejected() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "Alice", "case matters", now));

    let err = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Rejected(PreconditionFailure::HandleMismatch { .. })
    ));
    assert_eq!(harness.classifier.call_count(), 0);
}

#[tokio::test]
async fn duplicates_conflict_across_tenants_even_after_rejection() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "wagmi", now));

    let receipt = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap();
    harness
        .ledger
        .reject(&guild(), &receipt.submission_id, "mod-1", None)
        .unwrap();

    let other_guild = TenantId("guild-2".to_string());
    let err = harness
        .submissions
        .submit(&other_guild, &alice(), "2000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Rejected(PreconditionFailure::Duplicate)
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(harness.classifier.call_count(), 1);
}

#[tokio::test]
async fn policy_updates_are_clamped_and_applied() {
    let harness = registered_harness().await;

    let policy = harness
        .submissions
        .update_policy(
            &guild(),
            PolicyUpdate {
                max_post_age_days: Some(0.4),
                sentiment_min_confidence: Some(1.7),
            },
        )
        .unwrap();
    assert_eq!(policy.max_post_age_days, 1);
    assert_eq!(policy.sentiment_min_confidence, 1.0);

    let other = harness.submissions.policy(&TenantId("guild-2".into())).unwrap();
    assert_eq!(other.max_post_age_days, 7);

    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "two days old", now - Duration::days(2)));
    let err = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Rejected(PreconditionFailure::TooOld { max_days: 1 })
    ));
}

#[tokio::test]
async fn listing_filters_and_orders_newest_first() {
    let harness = registered_harness().await;
    for (index, reference) in ["4000", "4001", "4002"].iter().enumerate() {
        let now = harness.clock.now();
        harness.content.publish(
            reference,
            post(reference, "alice", &format!("post number {index}"), now),
        );
        harness
            .submissions
            .submit(&guild(), &alice(), reference)
            .await
            .unwrap();
        harness.clock.advance(Duration::minutes(1));
    }

    let all = harness
        .submissions
        .list(&guild(), SubmissionQuery::default())
        .unwrap();
    let ids: Vec<_> = all.iter().map(|row| row.content.stable_id.as_str()).collect();
    assert_eq!(ids, vec!["4002", "4001", "4000"]);

    let searched = harness
        .submissions
        .list(
            &guild(),
            SubmissionQuery {
                search: Some("NUMBER 1".to_string()),
                ..SubmissionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].content.stable_id, "4001");

    harness
        .ledger
        .award_points(&guild(), &all[0].id, "mod-1", 10.0, None, None)
        .unwrap();
    let unawarded = harness
        .submissions
        .list(
            &guild(),
            SubmissionQuery {
                unawarded: true,
                ..SubmissionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(unawarded.len(), 2);

    let other = harness
        .submissions
        .list(&TenantId("guild-2".into()), SubmissionQuery::default())
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn moderation_overrides_and_points_ledger() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "wagmi", now));
    let receipt = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap();
    let id = receipt.submission_id;

    let rejected = harness
        .ledger
        .reject(&guild(), &id, "mod-1", Some("   ".to_string()))
        .unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.decision_reason, "Rejected by moderator.");

    let approved = harness.ledger.approve(&guild(), &id, "mod-2").unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);
    assert_eq!(approved.decision_reason, "Approved by moderator.");
    let stored = harness.submissions.get(&guild(), &id).unwrap();
    assert_eq!(stored.decided_by.as_deref(), Some("mod-2"));

    let awarded = harness
        .ledger
        .award_points(&guild(), &id, "mod-2", 12.9, None, Some("nice".to_string()))
        .unwrap();
    assert!(awarded.points.awarded);
    assert_eq!(awarded.points.amount, Some(12));
    assert_eq!(awarded.points.currency.as_deref(), Some("points"));
    assert_eq!(awarded.points.awarded_by.as_deref(), Some("mod-2"));

    let revoked = harness
        .ledger
        .revoke_points(&guild(), &id, "mod-3", Some("duplicate account".to_string()))
        .unwrap();
    assert!(!revoked.points.awarded);
    assert!(revoked.points.amount.is_none());
    assert!(revoked.points.currency.is_none());
    assert!(revoked.points.awarded_at.is_none());
    assert!(revoked.points.awarded_by.is_none());
    assert_eq!(revoked.points.note.as_deref(), Some("duplicate account"));
    assert_eq!(revoked.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn moderation_validates_amounts_and_tenant() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "wagmi", now));
    let id = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap()
        .submission_id;

    for amount in [-1.0, f64::NAN, f64::INFINITY, 1e19, f64::MAX] {
        let err = harness
            .ledger
            .award_points(&guild(), &id, "mod-1", amount, None, None)
            .unwrap_err();
        assert!(matches!(err, ModerationError::Validation(_)));
    }
    let stored = harness.submissions.get(&guild(), &id).unwrap();
    assert!(!stored.points.awarded);

    let err = harness
        .ledger
        .approve(&TenantId("guild-2".into()), &id, "mod-1")
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound));
    assert!(matches!(
        harness.submissions.get(&TenantId("guild-2".into()), &id),
        Err(SubmissionError::NotFound)
    ));
}

/// Inserts a competing pending code for the same account just before the first insert lands.
struct ContendedAccounts {
    inner: MemoryStore,
    raced: AtomicBool,
}

impl AccountRepository for ContendedAccounts {
    fn account(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        self.inner.account(id)
    }

    fn ensure_account(&self, id: &AccountId) -> Result<Account, RepositoryError> {
        self.inner.ensure_account(id)
    }

    fn active_pending(
        &self,
        id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingRegistration>, RepositoryError> {
        self.inner.active_pending(id, now)
    }

    fn insert_pending(&self, pending: PendingRegistration) -> Result<(), RepositoryError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.insert_pending(PendingRegistration::issue(
                pending.account_id.clone(),
                pending.requested_handle.clone(),
                "CMC-WQNNERST".to_string(),
                pending.issued_at,
            ))?;
        }
        self.inner.insert_pending(pending)
    }

    fn complete_registration(
        &self,
        id: &AccountId,
        pending: &PendingId,
        handle: &str,
        at: DateTime<Utc>,
    ) -> Result<Account, RepositoryError> {
        self.inner.complete_registration(id, pending, handle, at)
    }

    fn reset_registration(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.inner.reset_registration(id, at)
    }
}

/// Lets another tenant store the same post right before the first insert, and lets a second
/// moderator act right before the first `modify`.
struct ContendedSubmissions {
    inner: MemoryStore,
    rival_tenant: Option<TenantId>,
    rival_moderator: Mutex<Option<(Arc<ModerationLedger<MemoryStore>>, TenantId)>>,
}

impl ContendedSubmissions {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            rival_tenant: None,
            rival_moderator: Mutex::new(None),
        }
    }
}

impl SubmissionRepository for ContendedSubmissions {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        if let Some(rival) = &self.rival_tenant {
            let mut competing = submission.clone();
            competing.id = SubmissionId::generate();
            competing.tenant_id = rival.clone();
            self.inner.insert(competing)?;
        }
        self.inner.insert(submission)
    }

    fn modify<F>(&self, id: &SubmissionId, change: F) -> Result<Submission, RepositoryError>
    where
        F: FnOnce(&mut Submission) -> Result<(), RepositoryError>,
    {
        let rival = self.rival_moderator.lock().unwrap().take();
        if let Some((ledger, tenant)) = rival {
            ledger
                .award_points(&tenant, id, "mod-b", 25.0, None, None)
                .unwrap();
        }
        self.inner.modify(id, change)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn contains_stable_id(&self, stable_id: &str) -> Result<bool, RepositoryError> {
        self.inner.contains_stable_id(stable_id)
    }

    fn list(
        &self,
        tenant: &TenantId,
        query: &SubmissionQuery,
    ) -> Result<Vec<Submission>, RepositoryError> {
        self.inner.list(tenant, query)
    }
}

/// Lets the clock run past the code expiry while the post is being fetched.
struct SlowContent {
    inner: Arc<FakeContent>,
    clock: Arc<FixedClock>,
}

#[async_trait]
impl ContentSource for SlowContent {
    async fn fetch(&self, reference: &str) -> Result<NormalizedContent, ContentError> {
        self.clock.advance(Duration::hours(13));
        self.inner.fetch(reference).await
    }
}

#[tokio::test]
async fn losing_a_concurrent_registration_reports_the_winning_code() {
    let harness = Harness::new(&[]);
    let accounts = Arc::new(ContendedAccounts {
        inner: (*harness.store).clone(),
        raced: AtomicBool::new(false),
    });
    let registrations = RegistrationService::with_parts(
        accounts,
        harness.content.clone(),
        Arc::new(QueuedCodes::new(&["CMC-AB3DEFGH"])),
        harness.clock.clone(),
    );

    let err = registrations.register(&alice(), "alice").unwrap_err();
    match err {
        RegistrationError::ActiveCodeExists { issued } => assert_eq!(issued.code, "CMC-WQNNERST"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn registration_gives_up_after_repeated_code_collisions() {
    let harness = Harness::new(&["CMC-AB3DEFGH"; 6]);
    harness.registrations.register(&alice(), "alice").unwrap();

    let bob = AccountId("account-b".to_string());
    let err = harness.registrations.register(&bob, "bob").unwrap_err();
    assert!(matches!(err, RegistrationError::CodeSpaceExhausted));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(harness
        .store
        .active_pending(&bob, harness.clock.now())
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn code_expiring_during_fetch_does_not_bind_the_handle() {
    let harness = Harness::new(&[]);
    let registrations = RegistrationService::with_parts(
        harness.store.clone(),
        Arc::new(SlowContent {
            inner: harness.content.clone(),
            clock: harness.clock.clone(),
        }),
        Arc::new(QueuedCodes::new(&["CMC-AB3DEFGH"])),
        harness.clock.clone(),
    );
    registrations.register(&alice(), "alice").unwrap();
    harness.content.publish(
        "1000",
        post("1000", "alice", "CMC-AB3DEFGH", start() + Duration::hours(1)),
    );

    let err = registrations.verify(&alice(), "1000").await.unwrap_err();
    assert!(matches!(err, RegistrationError::NoActiveCode));
    let account = harness.store.account(&alice()).unwrap().unwrap();
    assert!(account.registered_handle.is_none());
}

#[tokio::test]
async fn losing_the_insert_race_is_a_duplicate() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "wagmi", now));

    let mut submissions = ContendedSubmissions::new((*harness.store).clone());
    submissions.rival_tenant = Some(TenantId("guild-2".to_string()));
    let service = SubmissionService::new(
        Arc::new(submissions),
        harness.store.clone(),
        harness.store.clone(),
        harness.content.clone(),
        harness.classifier.clone(),
        GuildPolicy::default(),
    )
    .with_clock(harness.clock.clone());

    let err = service.submit(&guild(), &alice(), "2000").await.unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Rejected(PreconditionFailure::Duplicate)
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(harness.classifier.call_count(), 1);
    assert!(harness
        .submissions
        .list(&guild(), SubmissionQuery::default())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn interleaved_moderation_keeps_both_changes() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "wagmi", now));
    let id = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap()
        .submission_id;

    let submissions = ContendedSubmissions::new((*harness.store).clone());
    *submissions.rival_moderator.lock().unwrap() = Some((harness.ledger.clone(), guild()));
    let ledger = ModerationLedger::new(Arc::new(submissions)).with_clock(harness.clock.clone());

    let receipt = ledger
        .reject(&guild(), &id, "mod-a", Some("off topic".to_string()))
        .unwrap();
    assert_eq!(receipt.status, SubmissionStatus::Rejected);
    assert!(receipt.points.awarded);

    let stored = harness.submissions.get(&guild(), &id).unwrap();
    assert_eq!(stored.status, SubmissionStatus::Rejected);
    assert_eq!(stored.decided_by.as_deref(), Some("mod-a"));
    assert!(stored.points.awarded);
    assert_eq!(stored.points.amount, Some(25));
    assert_eq!(stored.points.awarded_by.as_deref(), Some("mod-b"));
}

#[tokio::test]
async fn rejected_moderation_leaves_the_record_untouched() {
    let harness = registered_harness().await;
    let now = harness.clock.now();
    harness
        .content
        .publish("2000", post("2000", "alice", "wagmi", now));
    let id = harness
        .submissions
        .submit(&guild(), &alice(), "2000")
        .await
        .unwrap()
        .submission_id;
    let before = harness.submissions.get(&guild(), &id).unwrap();

    let err = harness
        .ledger
        .reject(&TenantId("guild-2".into()), &id, "mod-a", None)
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound));
    assert_eq!(harness.submissions.get(&guild(), &id).unwrap(), before);
}
