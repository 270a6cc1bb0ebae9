/// A single cancellable delayed callback on the engine clock.
///
/// Scheduling replaces any pending deadline; there is never more than one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Deadline {
    due_at_ms: Option<u64>,
}

impl Deadline {
    pub(super) fn schedule(&mut self, due_at_ms: u64) {
        self.due_at_ms = Some(due_at_ms);
    }

    pub(super) fn cancel(&mut self) {
        self.due_at_ms = None;
    }

    pub(super) fn due_at(&self) -> Option<u64> {
        self.due_at_ms
    }

    /// Disarms and returns true once `now_ms` has reached the deadline.
    pub(super) fn fire_if_due(&mut self, now_ms: u64) -> bool {
        match self.due_at_ms {
            Some(due) if now_ms >= due => {
                self.due_at_ms = None;
                true
            }
            _ => false,
        }
    }
}
