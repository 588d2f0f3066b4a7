use serde::{Deserialize, Serialize};

use super::geometry::{occluding_bands, Band, BandSide, Rect, Viewport};

pub const OVERLAY_ELEMENT_ID: &str = "algorithm-block-overlay";
pub const COUNTDOWN_ELEMENT_ID: &str = "block-algo-countdown";

const TITLE: &str = "⚠️ 您可能沉迷于推荐算法";

/// How the block occludes the page. Chosen once per controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OverlayStrategy {
    /// One opaque layer over everything; page scroll frozen.
    FullBlock,
    /// Bands around the page's search box; scroll left alone.
    Cutout,
}

impl Default for OverlayStrategy {
    fn default() -> Self {
        OverlayStrategy::Cutout
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMessage {
    pub countdown_secs: u64,
    pub occurrence: u32,
}

impl OverlayMessage {
    pub fn title(&self) -> &'static str {
        TITLE
    }

    /// Text before and after the live countdown numeral.
    pub fn tip_parts(&self) -> (&'static str, &'static str) {
        ("屏幕将在 ", " 秒后恢复")
    }

    pub fn tip_text(&self) -> String {
        let (before, after) = self.tip_parts();
        format!("{before}{}{after}", self.countdown_secs)
    }

    pub fn note_text(&self) -> String {
        format!("（第 {} 次拦截）", self.occurrence)
    }
}

/// Everything a surface needs to draw one block.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub strategy: OverlayStrategy,
    pub bands: Vec<Band>,
    pub message: OverlayMessage,
    pub freeze_scroll: bool,
    pub message_intercepts_pointer: bool,
}

impl OverlayView {
    pub fn full_block(viewport: Viewport, message: OverlayMessage) -> Self {
        Self {
            strategy: OverlayStrategy::FullBlock,
            bands: vec![Band {
                side: BandSide::Full,
                rect: viewport.rect(),
            }],
            message,
            freeze_scroll: true,
            message_intercepts_pointer: true,
        }
    }

    pub fn cutout(viewport: Viewport, search_box: Option<Rect>, message: OverlayMessage) -> Self {
        Self {
            strategy: OverlayStrategy::Cutout,
            bands: occluding_bands(viewport, search_box),
            message,
            freeze_scroll: false,
            message_intercepts_pointer: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OverlayMessage {
        OverlayMessage {
            countdown_secs: 5,
            occurrence: 2,
        }
    }

    #[test]
    fn message_text_matches_product_copy() {
        let message = message();
        assert_eq!(message.tip_text(), "屏幕将在 5 秒后恢复");
        assert_eq!(message.note_text(), "（第 2 次拦截）");
        assert!(message.title().contains("推荐算法"));
    }

    #[test]
    fn full_block_freezes_scroll_and_blocks_pointer() {
        let view = OverlayView::full_block(Viewport::new(800.0, 600.0), message());
        assert!(view.freeze_scroll);
        assert!(view.message_intercepts_pointer);
        assert_eq!(view.bands.len(), 1);
    }

    #[test]
    fn cutout_leaves_scroll_and_pointer_to_the_bands() {
        let view = OverlayView::cutout(
            Viewport::new(800.0, 600.0),
            Some(Rect::new(200.0, 10.0, 300.0, 30.0)),
            message(),
        );
        assert!(!view.freeze_scroll);
        assert!(!view.message_intercepts_pointer);
        assert_eq!(view.bands.len(), 4);
    }
}
