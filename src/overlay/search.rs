use super::geometry::Rect;

/// Selectors tried in order when looking for the page's search box: generic
/// search inputs first, then per-site fallbacks.
pub const SEARCH_SELECTORS: &[&str] = &[
    "input[type=\"search\"]",
    "[role=\"search\"] input",
    "input[name*=\"search\" i]",
    "input[placeholder*=\"搜索\"]",
    "input[placeholder*=\"search\" i]",
    // bilibili
    ".nav-search-input",
    "input.nav-search-keyword",
    // zhihu
    ".SearchBar-input input",
    "input.Input[placeholder]",
    // xiaohongshu
    "#search-input",
    ".search-input",
];

/// Read-only view of the page used to locate elements.
pub trait ElementProbe {
    type Element: Clone;

    /// Elements matching `selector`, in document order. An invalid selector
    /// yields no elements.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    fn bounding_rect(&self, element: &Self::Element) -> Rect;
}

/// Pick the visible candidate with the largest area. Ties keep the first one
/// seen.
pub fn best_match<E>(candidates: impl IntoIterator<Item = (E, Rect)>) -> Option<(E, Rect)> {
    let mut best: Option<(E, Rect)> = None;
    for (element, rect) in candidates {
        if !rect.is_visible() {
            continue;
        }
        let better = match &best {
            Some((_, current)) => rect.area() > current.area(),
            None => true,
        };
        if better {
            best = Some((element, rect));
        }
    }
    best
}

/// Largest visible element matched by any of [`SEARCH_SELECTORS`].
pub fn find_search_box<P: ElementProbe>(probe: &P) -> Option<(P::Element, Rect)> {
    let candidates = SEARCH_SELECTORS.iter().flat_map(|selector| {
        probe
            .query_all(selector)
            .into_iter()
            .map(|element| {
                let rect = probe.bounding_rect(&element);
                (element, rect)
            })
            .collect::<Vec<_>>()
    });
    best_match(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticPage {
        elements: Vec<(&'static str, &'static str, Rect)>,
    }

    impl ElementProbe for StaticPage {
        type Element = &'static str;

        fn query_all(&self, selector: &str) -> Vec<&'static str> {
            self.elements
                .iter()
                .filter(|(sel, _, _)| *sel == selector)
                .map(|(_, id, _)| *id)
                .collect()
        }

        fn bounding_rect(&self, element: &&'static str) -> Rect {
            self.elements
                .iter()
                .find(|(_, id, _)| id == element)
                .map(|(_, _, rect)| *rect)
                .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
        }
    }

    #[test]
    fn largest_area_wins_across_selectors() {
        let page = StaticPage {
            elements: vec![
                ("input[type=\"search\"]", "small", Rect::new(0.0, 0.0, 100.0, 20.0)),
                (".nav-search-input", "large", Rect::new(0.0, 0.0, 400.0, 40.0)),
            ],
        };
        let (element, rect) = find_search_box(&page).unwrap();
        assert_eq!(element, "large");
        assert_eq!(rect.width, 400.0);
    }

    #[test]
    fn ties_keep_selector_order_then_document_order() {
        let same = Rect::new(0.0, 0.0, 200.0, 30.0);
        let page = StaticPage {
            elements: vec![
                ("#search-input", "site", same),
                ("input[type=\"search\"]", "generic-a", same),
                ("input[type=\"search\"]", "generic-b", same),
            ],
        };
        assert_eq!(find_search_box(&page).unwrap().0, "generic-a");
    }

    #[test]
    fn hidden_elements_are_skipped() {
        let page = StaticPage {
            elements: vec![
                ("input[type=\"search\"]", "collapsed", Rect::new(10.0, 10.0, 300.0, 0.0)),
                (".search-input", "visible", Rect::new(10.0, 10.0, 50.0, 20.0)),
            ],
        };
        assert_eq!(find_search_box(&page).unwrap().0, "visible");
    }

    #[test]
    fn no_candidates_means_no_match() {
        let page = StaticPage { elements: vec![] };
        assert!(find_search_box(&page).is_none());
        assert!(best_match(vec![("x", Rect::new(0.0, 0.0, -5.0, 5.0))]).is_none());
    }
}
