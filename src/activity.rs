use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User input that proves the page is being actively used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Scroll,
    MouseMove,
    Click,
    KeyDown,
    TouchStart,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::Scroll,
        ActivityKind::MouseMove,
        ActivityKind::Click,
        ActivityKind::KeyDown,
        ActivityKind::TouchStart,
    ];

    /// DOM event type the listener is registered for.
    pub fn event_name(&self) -> &'static str {
        match self {
            ActivityKind::Scroll => "scroll",
            ActivityKind::MouseMove => "mousemove",
            ActivityKind::Click => "click",
            ActivityKind::KeyDown => "keydown",
            ActivityKind::TouchStart => "touchstart",
        }
    }

    /// Keydown stays non-passive; everything else never calls `preventDefault`.
    pub fn is_passive(&self) -> bool {
        !matches!(self, ActivityKind::KeyDown)
    }
}

impl FromStr for ActivityKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        let needle = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.event_name() == needle)
            .ok_or_else(|| anyhow::anyhow!("unknown activity event {value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_keydown_is_active_listener() {
        let passive: Vec<_> = ActivityKind::ALL.iter().filter(|k| k.is_passive()).collect();
        assert_eq!(passive.len(), 4);
        assert!(!ActivityKind::KeyDown.is_passive());
    }

    #[test]
    fn parses_event_names() {
        assert_eq!("mousemove".parse::<ActivityKind>().unwrap(), ActivityKind::MouseMove);
        assert_eq!(" TouchStart ".parse::<ActivityKind>().unwrap(), ActivityKind::TouchStart);
        assert!("wheel".parse::<ActivityKind>().is_err());
    }
}
