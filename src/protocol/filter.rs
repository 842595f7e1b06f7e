use crate::protocol::{Event, EventId};
use serde::{Deserialize, Serialize};

/// A NIP-01 subscription filter
///
/// Only the fields the thread crawl issues are modelled. Absent fields are
/// omitted from the wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// Values of the `#e` tag filter
    #[serde(rename = "#e", default, skip_serializing_if = "Option::is_none")]
    pub referenced_events: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Filter {
    /// Filter for the event whose id equals `id`, limit 1
    pub fn by_id(id: &EventId) -> Self {
        Self {
            ids: Some(vec![id.to_string()]),
            referenced_events: None,
            limit: Some(1),
        }
    }

    /// Filter for every event whose `e` tag references `id`
    ///
    /// No limit is set; whatever cap the relay applies is out of our hands.
    pub fn referencing(id: &EventId) -> Self {
        Self {
            ids: None,
            referenced_events: Some(vec![id.to_string()]),
            limit: None,
        }
    }

    /// Returns true if `event` satisfies every constraint of this filter
    ///
    /// The limit is not considered here; it applies to result sets.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| id == &event.id) {
                return false;
            }
        }

        if let Some(refs) = &self.referenced_events {
            let hit = event.tags.iter().any(|t| {
                t.name() == Some("e") && t.value().is_some_and(|v| refs.iter().any(|r| r == v))
            });
            if !hit {
                return false;
            }
        }

        true
    }
}
