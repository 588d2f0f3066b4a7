/// One-shot wait for a resource that may not exist yet (the document body,
/// typically).
///
/// The host calls [`Deferred::poll`] whenever something might have changed
/// (a mutation observer callback, a timer). The first poll that finds the
/// resource hands it out and marks the wait resolved; every later poll returns
/// `None`, which tells the host to detach its observer.
pub struct Deferred<F> {
    probe: F,
    resolved: bool,
}

impl<F, T> Deferred<F>
where
    F: FnMut() -> Option<T>,
{
    pub fn new(probe: F) -> Self {
        Self {
            probe,
            resolved: false,
        }
    }

    pub fn poll(&mut self) -> Option<T> {
        if self.resolved {
            return None;
        }
        let resource = (self.probe)()?;
        self.resolved = true;
        Some(resource)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn resolves_once_when_resource_appears() {
        let available = Cell::new(false);
        let mut wait = Deferred::new(|| available.get().then_some("body"));

        assert_eq!(wait.poll(), None);
        assert!(!wait.is_resolved());

        available.set(true);
        assert_eq!(wait.poll(), Some("body"));
        assert!(wait.is_resolved());
        assert_eq!(wait.poll(), None);
    }

    #[test]
    fn stops_probing_after_resolution() {
        let calls = Cell::new(0);
        let mut wait = Deferred::new(|| {
            calls.set(calls.get() + 1);
            Some(())
        });
        assert!(wait.poll().is_some());
        assert!(wait.poll().is_none());
        assert_eq!(calls.get(), 1);
    }
}
