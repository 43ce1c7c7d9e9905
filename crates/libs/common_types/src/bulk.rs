use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The photos a bulk run targets. Only photos that are not yet face-indexed are picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WorkingSet {
    #[serde(rename_all = "camelCase")]
    Photographer { photographer_id: String },
    #[serde(rename_all = "camelCase")]
    Event { event_id: String },
    #[serde(rename_all = "camelCase")]
    Photos { photo_ids: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexFailure {
    pub photo_id: String,
    pub reason: String,
}

/// Outcome of a bulk run, emitted once after the last item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkTally {
    pub successes: usize,
    pub failures: usize,
    pub processed: usize,
    pub total: usize,
    pub cancelled: bool,
    pub failed: Vec<IndexFailure>,
}

/// Progress events of a bulk run, delivered in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BulkProgress {
    Started {
        total: usize,
    },
    #[serde(rename_all = "camelCase")]
    Indexed {
        current: usize,
        total: usize,
        photo_id: String,
        faces: usize,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        current: usize,
        total: usize,
        photo_id: String,
        reason: String,
    },
    Finished {
        tally: BulkTally,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn working_set_wire_format() -> Result<(), serde_json::Error> {
        let set: WorkingSet =
            serde_json::from_value(json!({ "kind": "photographer", "photographerId": "ph_1" }))?;
        assert_eq!(
            set,
            WorkingSet::Photographer {
                photographer_id: "ph_1".to_owned()
            }
        );

        let set: WorkingSet =
            serde_json::from_value(json!({ "kind": "photos", "photoIds": ["a", "b"] }))?;
        assert_eq!(
            set,
            WorkingSet::Photos {
                photo_ids: vec!["a".to_owned(), "b".to_owned()]
            }
        );
        Ok(())
    }

    #[test]
    fn progress_is_tagged() -> Result<(), serde_json::Error> {
        let event = BulkProgress::Indexed {
            current: 3,
            total: 10,
            photo_id: "p3".to_owned(),
            faces: 1,
        };
        assert_eq!(
            serde_json::to_value(&event)?,
            json!({ "type": "indexed", "current": 3, "total": 10, "photoId": "p3", "faces": 1 })
        );
        Ok(())
    }
}
