pub mod countdown;
pub mod geometry;
pub mod search;
pub mod view;

#[cfg(test)]
pub(crate) mod fake;

pub use countdown::{Countdown, CountdownStep};
pub use geometry::{occluding_bands, Band, BandSide, Rect, Viewport, CUTOUT_PADDING_PX};
pub use search::{best_match, find_search_box, ElementProbe, SEARCH_SELECTORS};
pub use view::{OverlayMessage, OverlayStrategy, OverlayView};

/// Where the block is drawn. The browser implements this on the DOM; tests
/// and the simulator record or log the calls.
///
/// The controller guarantees the call order: `mount`, then any number of
/// `update_countdown`/`update_bands`, then `unmount`. Relayout listeners are
/// attached at most once per mount and detached exactly once before
/// `unmount` when they were attached.
pub trait OverlaySurface: ElementProbe {
    fn viewport(&self) -> Viewport;

    fn mount(&mut self, view: &OverlayView);

    fn update_countdown(&mut self, remaining_secs: u64);

    fn update_bands(&mut self, bands: &[Band]);

    /// Start calling back into the controller on resize and on any scroll
    /// (capture phase) so the bands follow the search box.
    fn attach_relayout_listeners(&mut self);

    fn detach_relayout_listeners(&mut self);

    fn unmount(&mut self);
}

/// The one live block.
#[derive(Debug, Clone)]
pub struct ActiveOverlay<E> {
    pub countdown: Countdown,
    pub occurrence: u32,
    pub search_box: Option<E>,
    pub listeners_attached: bool,
}
