//! Person nodes in the assembled graph

use super::types::PersonId;
use crate::store::PersonRecord;
use serde::{Deserialize, Serialize};

/// Linked external-profile attributes for a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub handle: String,
    pub follower_count: Option<u32>,
    pub repo_count: Option<u32>,
}

/// A person in the relationship graph.
///
/// Owned by the assembled graph for the duration of one graph instance;
/// sourced read-only from the person records in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonNode {
    pub id: PersonId,
    pub name: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub profile: Option<ExternalProfile>,
}

impl PersonNode {
    pub fn new(id: PersonId, name: impl Into<String>) -> Self {
        PersonNode {
            id,
            name: name.into(),
            headline: None,
            location: None,
            profile: None,
        }
    }

    /// External handle, if a profile is linked.
    pub fn handle(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.handle.as_str())
    }

    pub fn follower_count(&self) -> Option<u32> {
        self.profile.as_ref().and_then(|p| p.follower_count)
    }

    pub fn repo_count(&self) -> Option<u32> {
        self.profile.as_ref().and_then(|p| p.repo_count)
    }

    /// Case-insensitive substring match against the headline.
    pub fn headline_matches(&self, concept: &str) -> bool {
        let needle = concept.to_lowercase();
        self.headline
            .as_deref()
            .is_some_and(|h| h.to_lowercase().contains(&needle))
    }
}

impl From<PersonRecord> for PersonNode {
    fn from(record: PersonRecord) -> Self {
        let profile = record.external_handle.map(|handle| ExternalProfile {
            handle,
            follower_count: record.external_follower_count,
            repo_count: record.external_repo_count,
        });

        PersonNode {
            id: record.person_id,
            name: record.full_name,
            headline: record.headline,
            location: record.location,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_matching_is_case_insensitive() {
        let mut node = PersonNode::new(PersonId::new(1), "Ada");
        node.headline = Some("Distributed Systems Engineer".to_string());

        assert!(node.headline_matches("distributed systems"));
        assert!(node.headline_matches("ENGINEER"));
        assert!(!node.headline_matches("biology"));
    }

    #[test]
    fn test_headline_matching_without_headline() {
        let node = PersonNode::new(PersonId::new(2), "Grace");
        assert!(!node.headline_matches("anything"));
    }

    #[test]
    fn test_from_record_builds_profile() {
        let record = PersonRecord {
            person_id: PersonId::new(3),
            full_name: "Lin".to_string(),
            headline: Some("Compiler engineer".to_string()),
            location: None,
            external_handle: Some("lin-dev".to_string()),
            external_follower_count: Some(120),
            external_repo_count: None,
        };

        let node = PersonNode::from(record);
        assert_eq!(node.handle(), Some("lin-dev"));
        assert_eq!(node.follower_count(), Some(120));
        assert_eq!(node.repo_count(), None);
    }
}
