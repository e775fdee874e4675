#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use post_verifier::clock::FixedClock;
use post_verifier::store::MemoryStore;
use post_verifier::workflows::content::{
    AdapterError, Bullish, ContentError, ContentSource, NormalizedContent,
};
use post_verifier::workflows::moderation::ModerationLedger;
use post_verifier::workflows::registration::{CodeGenerator, RegistrationService};
use post_verifier::workflows::sentiment::{
    Classification, ClassificationError, Classifier, SentimentLabel, SentimentResult,
};
use post_verifier::workflows::submission::{GuildPolicy, SubmissionService};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn post(stable_id: &str, owner: &str, text: &str, posted_at: DateTime<Utc>) -> NormalizedContent {
    NormalizedContent {
        stable_id: stable_id.to_string(),
        url: format!("https://coinmarketcap.com/community/post/{stable_id}"),
        owner_handle: owner.to_string(),
        text_content: text.to_string(),
        post_time_ms: posted_at.timestamp_millis(),
        bullish: Bullish::Yes,
    }
}

/// Serves posts by reference and counts fetches.
#[derive(Default)]
pub struct FakeContent {
    posts: Mutex<HashMap<String, NormalizedContent>>,
    pub calls: AtomicUsize,
}

impl FakeContent {
    pub fn publish(&self, reference: &str, content: NormalizedContent) {
        self.posts
            .lock()
            .unwrap()
            .insert(reference.to_string(), content);
    }
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn fetch(&self, reference: &str) -> Result<NormalizedContent, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.posts
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| ContentError::Adapter(AdapterError(format!("no post {reference}"))))
    }
}

/// Returns a configurable verdict and counts classification calls.
pub struct FakeClassifier {
    verdict: Mutex<(SentimentLabel, f64)>,
    pub calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        Self {
            verdict: Mutex::new((label, confidence)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, label: SentimentLabel, confidence: f64) {
        *self.verdict.lock().unwrap() = (label, confidence);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (label, confidence) = *self.verdict.lock().unwrap();
        Ok(Classification {
            result: SentimentResult {
                label,
                confidence,
                language: "en".to_string(),
                rationale: "fixture".to_string(),
            },
            raw: json!({ "label": label.as_str(), "confidence": confidence }),
            model: "qwen3-14b".to_string(),
        })
    }
}

/// Hands out queued codes in order.
pub struct QueuedCodes(Mutex<VecDeque<String>>);

impl QueuedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self(Mutex::new(codes.iter().map(|code| code.to_string()).collect()))
    }
}

impl CodeGenerator for QueuedCodes {
    fn generate(&self) -> String {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "CMC-ZZZZZZZZ".to_string())
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub content: Arc<FakeContent>,
    pub classifier: Arc<FakeClassifier>,
    pub registrations: Arc<RegistrationService<MemoryStore>>,
    pub submissions: Arc<SubmissionService<MemoryStore, MemoryStore, MemoryStore>>,
    pub ledger: Arc<ModerationLedger<MemoryStore>>,
}

impl Harness {
    pub fn new(codes: &[&str]) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(start()));
        let content = Arc::new(FakeContent::default());
        let classifier = Arc::new(FakeClassifier::new(SentimentLabel::Positive, 0.9));

        let registrations = Arc::new(RegistrationService::with_parts(
            store.clone(),
            content.clone(),
            Arc::new(QueuedCodes::new(codes)),
            clock.clone(),
        ));
        let submissions = Arc::new(
            SubmissionService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                content.clone(),
                classifier.clone(),
                GuildPolicy::default(),
            )
            .with_clock(clock.clone()),
        );
        let ledger = Arc::new(ModerationLedger::new(store.clone()).with_clock(clock.clone()));

        Self {
            store,
            clock,
            content,
            classifier,
            registrations,
            submissions,
            ledger,
        }
    }
}
