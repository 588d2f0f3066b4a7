use serde::{Deserialize, Serialize};

/// Space kept clear around the detected search box.
pub const CUTOUT_PADDING_PX: f64 = 6.0;

/// Axis-aligned rectangle in CSS pixels, viewport-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        if self.is_visible() {
            self.width * self.height
        } else {
            0.0
        }
    }

    /// Strictly positive extent on both axes.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn expand(&self, padding: f64) -> Rect {
        Rect::new(
            self.left - padding,
            self.top - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let clipped = Rect::new(left, top, right - left, bottom - top);
        clipped.is_visible().then_some(clipped)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BandSide {
    Full,
    Top,
    Bottom,
    Left,
    Right,
}

/// One opaque region of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub side: BandSide,
    pub rect: Rect,
}

/// Bands that cover `viewport` except the padded `cutout`.
///
/// Top and bottom span the full width; left and right fill the strip between
/// them, so the bands never overlap. The hole is clamped to the viewport and
/// zero-area bands are dropped. Without a usable cutout one `Full` band covers
/// everything.
pub fn occluding_bands(viewport: Viewport, cutout: Option<Rect>) -> Vec<Band> {
    let screen = viewport.rect();
    let full = || {
        vec![Band {
            side: BandSide::Full,
            rect: screen,
        }]
    };

    if !screen.is_visible() {
        return Vec::new();
    }
    let Some(hole) = cutout
        .filter(Rect::is_visible)
        .and_then(|rect| rect.expand(CUTOUT_PADDING_PX).intersect(&screen))
    else {
        return full();
    };

    let candidates = [
        Band {
            side: BandSide::Top,
            rect: Rect::new(0.0, 0.0, screen.width, hole.top),
        },
        Band {
            side: BandSide::Bottom,
            rect: Rect::new(0.0, hole.bottom(), screen.width, screen.height - hole.bottom()),
        },
        Band {
            side: BandSide::Left,
            rect: Rect::new(0.0, hole.top, hole.left, hole.height),
        },
        Band {
            side: BandSide::Right,
            rect: Rect::new(hole.right(), hole.top, screen.width - hole.right(), hole.height),
        },
    ];

    candidates
        .into_iter()
        .filter(|band| band.rect.is_visible())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn total_area(bands: &[Band]) -> f64 {
        bands.iter().map(|band| band.rect.area()).sum()
    }

    fn covered(bands: &[Band], x: f64, y: f64) -> bool {
        bands.iter().any(|band| band.rect.contains_point(x, y))
    }

    #[test]
    fn no_cutout_covers_viewport_with_one_band() {
        let bands = occluding_bands(Viewport::new(1280.0, 720.0), None);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].side, BandSide::Full);
        assert_eq!(bands[0].rect, Rect::new(0.0, 0.0, 1280.0, 720.0));
    }

    #[test]
    fn bands_leave_exactly_the_padded_rect_uncovered() {
        let viewport = Viewport::new(1280.0, 720.0);
        let search = Rect::new(400.0, 20.0, 480.0, 40.0);
        let bands = occluding_bands(viewport, Some(search));
        assert_eq!(bands.len(), 4);

        let padded = search.expand(CUTOUT_PADDING_PX);
        let expected = 1280.0 * 720.0 - padded.area();
        assert!((total_area(&bands) - expected).abs() < EPSILON);

        // Every pixel centre inside the padded rect is clear.
        let mut y = padded.top + 0.5;
        while y < padded.bottom() {
            let mut x = padded.left + 0.5;
            while x < padded.right() {
                assert!(!covered(&bands, x, y), "({x}, {y}) is covered");
                x += 1.0;
            }
            y += 1.0;
        }

        assert!(covered(&bands, padded.left - 0.5, padded.top + 1.0));
        assert!(covered(&bands, padded.right() + 0.5, padded.top + 1.0));
        assert!(covered(&bands, padded.left + 1.0, padded.top - 0.5));
        assert!(covered(&bands, padded.left + 1.0, padded.bottom() + 0.5));
    }

    #[test]
    fn bands_do_not_overlap() {
        let bands = occluding_bands(Viewport::new(800.0, 600.0), Some(Rect::new(100.0, 100.0, 200.0, 50.0)));
        for (i, a) in bands.iter().enumerate() {
            for b in &bands[i + 1..] {
                assert!(a.rect.intersect(&b.rect).is_none(), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn cutout_touching_the_edge_drops_empty_bands() {
        let viewport = Viewport::new(1000.0, 500.0);
        // Padding pushes the hole past the top and left edges.
        let search = Rect::new(2.0, 3.0, 300.0, 30.0);
        let bands = occluding_bands(viewport, Some(search));

        let sides: Vec<_> = bands.iter().map(|band| band.side).collect();
        assert_eq!(sides, vec![BandSide::Bottom, BandSide::Right]);

        let hole = search.expand(CUTOUT_PADDING_PX).intersect(&viewport.rect()).unwrap();
        assert!((total_area(&bands) - (1000.0 * 500.0 - hole.area())).abs() < EPSILON);
    }

    #[test]
    fn offscreen_or_empty_cutout_falls_back_to_full_band() {
        let viewport = Viewport::new(1000.0, 500.0);
        let below = occluding_bands(viewport, Some(Rect::new(10.0, 900.0, 200.0, 30.0)));
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].side, BandSide::Full);

        let collapsed = occluding_bands(viewport, Some(Rect::new(10.0, 10.0, 0.0, 30.0)));
        assert_eq!(collapsed[0].side, BandSide::Full);
    }

    #[test]
    fn intersect_requires_positive_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersect(&Rect::new(10.0, 0.0, 5.0, 5.0)).is_none());
        assert_eq!(
            a.intersect(&Rect::new(5.0, 5.0, 10.0, 10.0)),
            Some(Rect::new(5.0, 5.0, 5.0, 5.0))
        );
    }
}
