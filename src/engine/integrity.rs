use crate::domain::types::ClipboardEventKind;

/// Outcome of one focus-loss signal while the monitor is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegritySignal {
    /// Informational; the student may resume after acknowledging. The
    /// acknowledgement never resets the counter.
    Warning { count: u32, remaining: u32 },
    /// Threshold reached; the session must submit. The monitor deactivates
    /// itself until the next activation.
    ForceSubmit,
}

/// Counts focus-loss events during an active attempt. Deduplicating
/// multiple platform notifications for one underlying event is the
/// focus-signal source's responsibility; every delivered signal counts.
#[derive(Debug, Clone)]
pub struct IntegrityMonitor {
    warning_threshold: u32,
    warning_count: u32,
    active: bool,
    pending_acknowledgement: bool,
}

impl IntegrityMonitor {
    pub fn new(warning_threshold: u32) -> Self {
        Self { warning_threshold, warning_count: 0, active: false, pending_acknowledgement: false }
    }

    /// Fresh start: the counter resets only here.
    pub fn activate(&mut self) {
        self.warning_count = 0;
        self.active = true;
        self.pending_acknowledgement = false;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.pending_acknowledgement = false;
    }

    /// Reactivates without resetting the counter, for a session returning
    /// to testing after a failed submission.
    pub fn resume(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn record_focus_loss(&mut self) -> Option<IntegritySignal> {
        if !self.active {
            return None;
        }

        // Signals arriving before the previous warning was acknowledged
        // still increment; hiding true switches would defeat the monitor.
        self.warning_count += 1;

        if self.warning_count >= self.warning_threshold {
            self.deactivate();
            return Some(IntegritySignal::ForceSubmit);
        }

        self.pending_acknowledgement = true;
        Some(IntegritySignal::Warning {
            count: self.warning_count,
            remaining: self.warning_threshold - self.warning_count,
        })
    }

    pub fn has_pending_warning(&self) -> bool {
        self.pending_acknowledgement
    }

    pub fn acknowledge_warning(&mut self) {
        self.pending_acknowledgement = false;
    }
}

/// Parallel capability toggle with no state of its own: suppresses the
/// configured clipboard events exactly while an attempt is in testing.
#[derive(Debug, Clone)]
pub struct ClipboardGuard {
    suppressed: Vec<ClipboardEventKind>,
    active: bool,
}

impl ClipboardGuard {
    pub fn new(suppressed: Vec<ClipboardEventKind>) -> Self {
        Self { suppressed, active: false }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn blocks(&self, kind: ClipboardEventKind) -> bool {
        self.active && self.suppressed.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_below_threshold_and_forces_at_it() {
        let mut monitor = IntegrityMonitor::new(3);
        monitor.activate();

        assert_eq!(
            monitor.record_focus_loss(),
            Some(IntegritySignal::Warning { count: 1, remaining: 2 })
        );
        assert_eq!(
            monitor.record_focus_loss(),
            Some(IntegritySignal::Warning { count: 2, remaining: 1 })
        );
        assert_eq!(monitor.record_focus_loss(), Some(IntegritySignal::ForceSubmit));
        assert!(!monitor.is_active());
        // Inactive after forcing: the 4th signal is not processed.
        assert_eq!(monitor.record_focus_loss(), None);
        assert_eq!(monitor.warning_count(), 3);
    }

    #[test]
    fn acknowledgement_does_not_reset_counter() {
        let mut monitor = IntegrityMonitor::new(3);
        monitor.activate();
        monitor.record_focus_loss();
        assert!(monitor.has_pending_warning());
        monitor.acknowledge_warning();
        assert!(!monitor.has_pending_warning());
        assert_eq!(monitor.warning_count(), 1);
    }

    #[test]
    fn unacknowledged_signals_still_increment() {
        let mut monitor = IntegrityMonitor::new(5);
        monitor.activate();
        monitor.record_focus_loss();
        monitor.record_focus_loss();
        assert_eq!(monitor.warning_count(), 2);
    }

    #[test]
    fn counter_resets_only_on_activation() {
        let mut monitor = IntegrityMonitor::new(3);
        monitor.activate();
        monitor.record_focus_loss();
        monitor.deactivate();
        monitor.resume();
        assert_eq!(monitor.warning_count(), 1);
        monitor.activate();
        assert_eq!(monitor.warning_count(), 0);
    }

    #[test]
    fn inactive_monitor_ignores_signals() {
        let mut monitor = IntegrityMonitor::new(3);
        assert_eq!(monitor.record_focus_loss(), None);
        assert_eq!(monitor.warning_count(), 0);
    }

    #[test]
    fn clipboard_guard_tracks_activation() {
        let mut guard =
            ClipboardGuard::new(vec![ClipboardEventKind::Copy, ClipboardEventKind::Paste]);
        assert!(!guard.blocks(ClipboardEventKind::Copy));
        guard.activate();
        assert!(guard.blocks(ClipboardEventKind::Copy));
        assert!(!guard.blocks(ClipboardEventKind::Cut));
        guard.deactivate();
        assert!(!guard.blocks(ClipboardEventKind::Paste));
    }
}
