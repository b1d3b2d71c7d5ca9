//! Storefront content: brochures, essentials section, shelves, policies and
//! consultation requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use knobsshop_core::{
    BrochureId, CategoryId, ConsultationId, EssentialsId, PolicyId, PolicyStatus, PolicyTitle,
    ShelfId,
};

/// A downloadable product brochure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brochure {
    pub id: BrochureId,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub pdf_link: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The "essentials" homepage section: a heading plus a deck of cards, each
/// pointing at one or more categories. Cards live in a JSONB column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Essentials {
    pub id: EssentialsId,
    pub main_heading: String,
    pub main_description: String,
    pub cards: Vec<EssentialsCard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One card in the essentials deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssentialsCard {
    /// Stable key used to address the card on partial updates.
    pub id: String,
    /// Display ordinal ("01", "02", ...).
    pub number: String,
    pub title: String,
    pub description: String,
    pub bg_image: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

/// A content shelf: heading + copy + image, edited freely from the admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub heading: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A legal/policy document. One row per title; versions accumulate in a
/// JSONB column and the storefront reads the latest published one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub title: PolicyTitle,
    pub versions: Vec<PolicyVersion>,
}

/// One revision of a policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVersion {
    pub content: String,
    pub status: PolicyStatus,
    pub updated_at: DateTime<Utc>,
}

/// A design-consultation request submitted from the storefront form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub location: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
    pub mobile: Option<String>,
    /// Whether the mobile number is reachable on WhatsApp.
    pub whatsapp: bool,
    pub email: Option<String>,
    pub budget: Option<String>,
    pub interest: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Policy {
    /// Latest published version, if any.
    #[must_use]
    pub fn latest_published(&self) -> Option<&PolicyVersion> {
        self.versions
            .iter()
            .filter(|v| v.status == PolicyStatus::Published)
            .max_by_key(|v| v.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn version(status: PolicyStatus, age_days: i64) -> PolicyVersion {
        PolicyVersion {
            content: format!("rev at -{age_days}d"),
            status,
            updated_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn latest_published_skips_drafts() {
        let policy = Policy {
            id: PolicyId::generate(),
            title: PolicyTitle::Terms,
            versions: vec![
                version(PolicyStatus::Published, 5),
                version(PolicyStatus::Draft, 1),
                version(PolicyStatus::Published, 3),
            ],
        };
        let latest = policy.latest_published().expect("published version");
        assert_eq!(latest.content, "rev at -3d");
    }

    #[test]
    fn latest_published_is_none_for_all_drafts() {
        let policy = Policy {
            id: PolicyId::generate(),
            title: PolicyTitle::Warranty,
            versions: vec![version(PolicyStatus::Draft, 1)],
        };
        assert!(policy.latest_published().is_none());
    }
}
