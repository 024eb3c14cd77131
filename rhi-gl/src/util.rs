//! Small backend-internal helpers.

/// Guards a partially constructed GL object (or small group of them) so that
/// any early-return during validation destroys it. `disarm()` is called once
/// construction fully succeeds, so the object survives past the guard's drop.
///
/// This is the "scoped acquisition guard" spec.md §4.2/§9 requires of every
/// create path: allocate first, validate second, and let the guard clean up
/// on any validation failure in between.
pub struct ScopedRelease<F: FnMut()> {
    release: Option<F>,
}

impl<F: FnMut()> ScopedRelease<F> {
    pub fn new(release: F) -> ScopedRelease<F> {
        ScopedRelease {
            release: Some(release),
        }
    }

    /// Releases ownership to the caller: the wrapped destructor will not run.
    pub fn disarm(mut self) {
        self.release = None;
    }
}

impl<F: FnMut()> Drop for ScopedRelease<F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.as_mut() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn drop_without_disarm_runs_the_release() {
        let released = Cell::new(false);
        {
            let _guard = ScopedRelease::new(|| released.set(true));
        }
        assert!(released.get());
    }

    #[test]
    fn disarm_suppresses_the_release() {
        let released = Cell::new(false);
        {
            let guard = ScopedRelease::new(|| released.set(true));
            guard.disarm();
        }
        assert!(!released.get());
    }
}
