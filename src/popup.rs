use crate::timer::BlockQueryResponse;

/// Shown when the active tab has no content script to answer.
pub const UNAVAILABLE: &str = "未加载";

pub const ADDICTION_TIME_ELEMENT_ID: &str = "addictionTime";
pub const BLOCK_COUNT_ELEMENT_ID: &str = "blockCount";

pub fn addiction_time_text(reply: Option<&BlockQueryResponse>) -> String {
    match reply.and_then(BlockQueryResponse::time) {
        Some(secs) => format!("{}分{}秒", secs / 60, secs % 60),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn block_count_text(reply: Option<&BlockQueryResponse>) -> String {
    match reply.and_then(BlockQueryResponse::count) {
        Some(count) => count.to_string(),
        None => UNAVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_replies() {
        let time = BlockQueryResponse::AddictionTime { time: 125 };
        assert_eq!(addiction_time_text(Some(&time)), "2分5秒");
        let zero = BlockQueryResponse::AddictionTime { time: 0 };
        assert_eq!(addiction_time_text(Some(&zero)), "0分0秒");
        let count = BlockQueryResponse::BlockCount { count: 4 };
        assert_eq!(block_count_text(Some(&count)), "4");
    }

    #[test]
    fn missing_or_mismatched_reply_shows_placeholder() {
        assert_eq!(addiction_time_text(None), UNAVAILABLE);
        assert_eq!(block_count_text(None), UNAVAILABLE);
        let time = BlockQueryResponse::AddictionTime { time: 9 };
        assert_eq!(block_count_text(Some(&time)), UNAVAILABLE);
    }
}
