/// How often the elapsed-time badge is redrawn.
pub const BADGE_REFRESH_MS: u32 = 500;

pub const BADGE_ELEMENT_ID: &str = "block-algo-timer";

/// Inline styles for the badge: pinned bottom-left, never takes clicks.
pub const BADGE_STYLES: [(&str, &str); 10] = [
    ("position", "fixed"),
    ("left", "10px"),
    ("bottom", "10px"),
    ("z-index", "2147483647"),
    ("padding", "4px 8px"),
    ("border-radius", "4px"),
    ("background", "rgba(0, 0, 0, 0.6)"),
    ("color", "#fff"),
    ("font-size", "12px"),
    ("pointer-events", "none"),
];

pub fn badge_text(elapsed_secs: u64) -> String {
    format!("沉迷时间: {}m {}s", elapsed_secs / 60, elapsed_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_minutes_and_seconds() {
        assert_eq!(badge_text(0), "沉迷时间: 0m 0s");
        assert_eq!(badge_text(59), "沉迷时间: 0m 59s");
        assert_eq!(badge_text(61), "沉迷时间: 1m 1s");
        assert_eq!(badge_text(3_600), "沉迷时间: 60m 0s");
    }

    #[test]
    fn badge_sits_bottom_left() {
        let style = |name| BADGE_STYLES.iter().find(|(key, _)| *key == name).map(|(_, value)| *value);
        assert_eq!(style("left"), Some("10px"));
        assert_eq!(style("bottom"), Some("10px"));
        assert_eq!(style("right"), None);
        assert_eq!(style("pointer-events"), Some("none"));
    }
}
