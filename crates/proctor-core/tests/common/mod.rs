//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use proctor_core::{
    Certification, ContentGenerator, Domain, GeneratedItem, GenerationRequest, Item, ItemContent,
    ProctorError, ProctorResult, SqliteStore,
};
use proctor_core::traits::ItemStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const CERT_ID: &str = "pl-300";

/// Exam domains with their content weights.
pub const DOMAINS: [(&str, &str, f64); 4] = [
    ("prepare", "Prepare the Data", 0.275),
    ("model", "Model the Data", 0.275),
    ("visualize", "Visualize and Analyze the Data", 0.275),
    ("manage", "Manage and Secure Power BI", 0.175),
];

pub fn content(question: &str, correct_index: usize) -> ItemContent {
    ItemContent {
        scenario: format!("Scenario for {}", question),
        question: question.to_string(),
        options: ["A", "B", "C", "D"].iter().map(|o| o.to_string()).collect(),
        correct_index,
        explanation: format!("Option {} is correct", correct_index),
        option_explanations: Vec::new(),
    }
}

/// In-memory store with the PL-300 catalog and `per_domain` items in each domain.
///
/// Every seeded item has correct index 0 and difficulty 1000.
pub async fn seeded_store(per_domain: usize) -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store
        .insert_certification(&Certification::new(CERT_ID, "PL-300", "Power BI Data Analyst"))
        .unwrap();
    for (order, (id, name, weight)) in DOMAINS.iter().enumerate() {
        store
            .insert_domain(&Domain::new(*id, CERT_ID, *name, *weight, order as i32))
            .unwrap();
        for n in 0..per_domain {
            let item = Item::new(*id, CERT_ID, content(&format!("{id} #{n}"), 0))
                .with_id(format!("{id}-{n}"))
                .with_concept_tag(format!("{name} concept"));
            store.insert_item(&item).await.unwrap();
        }
    }
    store
}

/// Generator returning numbered items with correct index 0.
#[derive(Default)]
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    /// Fail every n-th call (1-based) when set.
    fail_every: Option<usize>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn failing_every(n: usize) -> Self {
        Self {
            fail_every: Some(n),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> ProctorResult<GeneratedItem> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_every.is_some_and(|n| call % n == 0) {
            return Err(ProctorError::generator("model overloaded"));
        }
        Ok(GeneratedItem {
            content: content(&format!("Generated {} #{}", request.domain_name, call), 0),
            concept_tag: format!("{} generated", request.domain_name),
        })
    }
}
