//! Certification and domain reference data.

use serde::{Deserialize, Serialize};

/// A certification exam (e.g. a vendor associate exam).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub id: String,
    /// Short exam code, unique across the catalog.
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Certification {
    /// Create an active certification.
    pub fn new(id: impl Into<String>, code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            title: title.into(),
            description: None,
            is_active: true,
        }
    }

    /// Name used when asking the content generator for items.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.code, self.title)
    }
}

/// A certification together with the number of items in its bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationSummary {
    #[serde(flatten)]
    pub certification: Certification,
    pub item_count: u64,
}

/// A topic area of a certification.
///
/// `weight` is the fraction of exam content attributed to the domain; weights
/// across a certification's domains sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub certification_id: String,
    pub name: String,
    pub weight: f64,
    pub sort_order: i32,
}

impl Domain {
    /// Create a domain.
    pub fn new(
        id: impl Into<String>,
        certification_id: impl Into<String>,
        name: impl Into<String>,
        weight: f64,
        sort_order: i32,
    ) -> Self {
        Self {
            id: id.into(),
            certification_id: certification_id.into(),
            name: name.into(),
            weight,
            sort_order,
        }
    }
}
