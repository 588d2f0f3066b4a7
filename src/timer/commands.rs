use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests the popup sends to the content script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockQuery {
    GetAddictionTime,
    GetBlockCount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BlockQueryResponse {
    AddictionTime { time: u64 },
    BlockCount { count: u32 },
}

impl BlockQuery {
    /// Decode an incoming message. Anything that is not one of our queries
    /// (other extensions' traffic included) is ignored.
    pub fn from_message(message: &Value) -> Option<Self> {
        serde_json::from_value(message.clone()).ok()
    }
}

impl BlockQueryResponse {
    pub fn time(&self) -> Option<u64> {
        match self {
            BlockQueryResponse::AddictionTime { time } => Some(*time),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            BlockQueryResponse::BlockCount { count } => Some(*count),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_wire_requests() {
        assert_eq!(
            BlockQuery::from_message(&json!({ "type": "GET_ADDICTION_TIME" })),
            Some(BlockQuery::GetAddictionTime)
        );
        assert_eq!(
            BlockQuery::from_message(&json!({ "type": "GET_BLOCK_COUNT" })),
            Some(BlockQuery::GetBlockCount)
        );
        assert_eq!(BlockQuery::from_message(&json!({ "type": "PING" })), None);
        assert_eq!(BlockQuery::from_message(&json!("GET_BLOCK_COUNT")), None);
    }

    #[test]
    fn responses_use_flat_wire_shape() {
        let time = serde_json::to_value(BlockQueryResponse::AddictionTime { time: 42 }).unwrap();
        assert_eq!(time, json!({ "time": 42 }));
        let count = serde_json::to_value(BlockQueryResponse::BlockCount { count: 3 }).unwrap();
        assert_eq!(count, json!({ "count": 3 }));
    }

    #[test]
    fn replies_decode_back_to_their_variant() {
        let time: BlockQueryResponse = serde_json::from_value(json!({ "time": 7 })).unwrap();
        assert_eq!(time.time(), Some(7));
        assert_eq!(time.count(), None);
        let count: BlockQueryResponse = serde_json::from_value(json!({ "count": 0 })).unwrap();
        assert_eq!(count.count(), Some(0));
    }
}
