//! Identifier types
//!
//! Flat entities are always addressed by server-issued integer ids.
//! Journey tree nodes may also be created locally before the tree is saved,
//! so they use [`NodeId`], which keeps the two numbering spaces apart.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-issued entity id. `0` marks an entity that has not been saved yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    /// Placeholder id carried by unsaved entities
    pub const NEW: EntityId = EntityId(0);

    pub fn is_new(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        EntityId(v)
    }
}

/// Journey tree node id
///
/// Serialized untagged: server ids are JSON numbers, local ids are strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    /// Issued by the content API
    Server(i64),
    /// Generated in the console for a node not yet persisted
    Local(String),
}

impl NodeId {
    /// Generate a fresh local id: `local-<unix millis>-<random hex>`
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let salt: u32 = rand::thread_rng().gen();
        NodeId::Local(format!("local-{}-{:08x}", millis, salt))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, NodeId::Local(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Server(id) => write!(f, "{}", id),
            NodeId::Local(id) => write!(f, "{}", id),
        }
    }
}

/// Parses path segments: all-digit strings become server ids
impl FromStr for NodeId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => NodeId::Server(id),
            Err(_) => NodeId::Local(s.to_string()),
        })
    }
}

impl From<i64> for NodeId {
    fn from(v: i64) -> Self {
        NodeId::Server(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_local_and_distinct() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert!(a.is_local());
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("local-"));
    }

    #[test]
    fn test_node_id_untagged_serde() {
        let server: NodeId = serde_json::from_str("42").unwrap();
        assert_eq!(server, NodeId::Server(42));

        let local: NodeId = serde_json::from_str("\"local-1-abc\"").unwrap();
        assert_eq!(local, NodeId::Local("local-1-abc".to_string()));

        assert_eq!(serde_json::to_string(&NodeId::Server(7)).unwrap(), "7");
    }

    #[test]
    fn test_node_id_from_path_segment() {
        assert_eq!("15".parse::<NodeId>().unwrap(), NodeId::Server(15));
        assert!("local-5-ff".parse::<NodeId>().unwrap().is_local());
    }

    #[test]
    fn test_entity_id_new() {
        assert!(EntityId::NEW.is_new());
        assert!(!EntityId(3).is_new());
        let parsed: EntityId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, EntityId(12));
    }
}
