use std::sync::{Arc, Mutex, MutexGuard};

use super::{Band, ElementProbe, OverlayStrategy, OverlaySurface, OverlayView, Rect, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Mounted {
        strategy: OverlayStrategy,
        bands: Vec<Band>,
        countdown_secs: u64,
        occurrence: u32,
    },
    Countdown(u64),
    Bands(Vec<Band>),
    ListenersAttached,
    ListenersDetached,
    Unmounted,
}

#[derive(Debug, Default)]
struct FakePage {
    viewport: Option<Viewport>,
    elements: Vec<(String, Rect)>,
    events: Vec<SurfaceEvent>,
    overlay_nodes: usize,
    scroll_frozen: bool,
    listeners: usize,
}

/// In-memory page that records every surface call. Clones share the page.
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    page: Arc<Mutex<FakePage>>,
}

impl FakeSurface {
    pub fn new(viewport: Viewport) -> Self {
        let surface = Self::default();
        surface.page().viewport = Some(viewport);
        surface
    }

    fn page(&self) -> MutexGuard<'_, FakePage> {
        self.page.lock().unwrap()
    }

    /// Add an element matched by `selector`; returns its handle.
    pub fn add_element(&self, selector: &str, rect: Rect) -> usize {
        let mut page = self.page();
        page.elements.push((selector.to_string(), rect));
        page.elements.len() - 1
    }

    pub fn move_element(&self, element: usize, rect: Rect) {
        self.page().elements[element].1 = rect;
    }

    pub fn resize(&self, viewport: Viewport) {
        self.page().viewport = Some(viewport);
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.page().events.clone()
    }

    pub fn overlay_nodes(&self) -> usize {
        self.page().overlay_nodes
    }

    pub fn scroll_frozen(&self) -> bool {
        self.page().scroll_frozen
    }

    pub fn live_listeners(&self) -> usize {
        self.page().listeners
    }

    pub fn mount_count(&self) -> usize {
        self.count(|event| matches!(event, SurfaceEvent::Mounted { .. }))
    }

    pub fn count(&self, predicate: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.page().events.iter().filter(|event| predicate(event)).count()
    }

    pub fn countdown_values(&self) -> Vec<u64> {
        self.page()
            .events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Mounted { countdown_secs, .. } => Some(*countdown_secs),
                SurfaceEvent::Countdown(secs) => Some(*secs),
                _ => None,
            })
            .collect()
    }

    pub fn last_bands(&self) -> Vec<Band> {
        self.page()
            .events
            .iter()
            .rev()
            .find_map(|event| match event {
                SurfaceEvent::Mounted { bands, .. } | SurfaceEvent::Bands(bands) => Some(bands.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl ElementProbe for FakeSurface {
    type Element = usize;

    fn query_all(&self, selector: &str) -> Vec<usize> {
        self.page()
            .elements
            .iter()
            .enumerate()
            .filter(|(_, (sel, _))| sel == selector)
            .map(|(index, _)| index)
            .collect()
    }

    fn bounding_rect(&self, element: &usize) -> Rect {
        self.page().elements[*element].1
    }
}

impl OverlaySurface for FakeSurface {
    fn viewport(&self) -> Viewport {
        self.page().viewport.unwrap_or(Viewport::new(1280.0, 720.0))
    }

    fn mount(&mut self, view: &OverlayView) {
        let mut page = self.page();
        page.overlay_nodes += 1;
        page.scroll_frozen = view.freeze_scroll;
        page.events.push(SurfaceEvent::Mounted {
            strategy: view.strategy,
            bands: view.bands.clone(),
            countdown_secs: view.message.countdown_secs,
            occurrence: view.message.occurrence,
        });
    }

    fn update_countdown(&mut self, remaining_secs: u64) {
        self.page().events.push(SurfaceEvent::Countdown(remaining_secs));
    }

    fn update_bands(&mut self, bands: &[Band]) {
        self.page().events.push(SurfaceEvent::Bands(bands.to_vec()));
    }

    fn attach_relayout_listeners(&mut self) {
        let mut page = self.page();
        page.listeners += 1;
        page.events.push(SurfaceEvent::ListenersAttached);
    }

    fn detach_relayout_listeners(&mut self) {
        let mut page = self.page();
        page.listeners -= 1;
        page.events.push(SurfaceEvent::ListenersDetached);
    }

    fn unmount(&mut self) {
        let mut page = self.page();
        page.overlay_nodes -= 1;
        page.scroll_frozen = false;
        page.events.push(SurfaceEvent::Unmounted);
    }
}
