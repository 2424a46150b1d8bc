/// At most one match resolution in flight per session.
///
/// Lives inside the session that owns it; no global flag.
#[derive(Debug, Default)]
pub struct ResolutionGuard {
    in_flight: bool,
    releases: u64,
}

impl ResolutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.in_flight
    }

    /// Take the guard; false if a resolution is already running
    pub fn try_acquire(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn release(&mut self) {
        if !self.in_flight {
            log::warn!("Resolution guard released while not held");
            return;
        }
        self.in_flight = false;
        self.releases += 1;
    }

    /// Completed acquire/release cycles
    pub fn releases(&self) -> u64 {
        self.releases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails() {
        let mut guard = ResolutionGuard::new();
        assert!(guard.try_acquire());
        assert!(!guard.try_acquire());
        assert!(guard.is_held());

        guard.release();
        assert!(!guard.is_held());
        assert!(guard.try_acquire());
    }

    #[test]
    fn test_release_counts_once() {
        let mut guard = ResolutionGuard::new();
        guard.try_acquire();
        guard.release();
        guard.release();
        assert_eq!(guard.releases(), 1);
    }
}
