use serde::{Deserialize, Serialize};

use crate::domain::{Group, GroupId};

/// One page of a list provider response. Only `results` is consumed by the
/// relocation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset<T> {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Dataset<T> {
    pub fn from_results(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            next: None,
            previous: None,
            results,
        }
    }
}

/// A single call issued against the relationship collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RelationshipCall {
    Associate { group: GroupId, target: GroupId },
    Disassociate { group: GroupId, parent: GroupId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: Group,
    pub parents: Vec<GroupId>,
    pub children: Vec<GroupId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_reads_results_and_ignores_paging_links() {
        let raw = r#"{"count":2,"next":"/groups/?page=2","results":[{"id":1,"name":"web"},{"id":2,"name":"db"}]}"#;
        let dataset: Dataset<Group> = serde_json::from_str(raw).expect("dataset");
        assert_eq!(dataset.results.len(), 2);
        assert_eq!(dataset.results[1], Group::new(GroupId(2), "db"));
        assert_eq!(dataset.previous, None);
    }

    #[test]
    fn relationship_call_uses_tagged_encoding() {
        let call = RelationshipCall::Disassociate {
            group: GroupId(4),
            parent: GroupId(9),
        };
        let encoded = serde_json::to_value(&call).expect("encode");
        assert_eq!(encoded["type"], "disassociate");
        assert_eq!(encoded["payload"]["parent"], 9);
    }
}
