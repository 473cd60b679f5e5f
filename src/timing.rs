//! Rate-limiting gates for event handlers.
//!
//! Both gates are pure state machines over a caller-supplied clock so the
//! scroll and resize paths stay testable off the event loop; the wasm layer
//! feeds them `js_sys::Date::now()` and owns the one pending timeout a
//! debounced action needs for its trailing edge.

/// Admits at most one call per window; calls while the gate is closed are
/// dropped, not queued. The first call in an idle period always passes.
pub struct Throttle {
    window_ms: f64,
    open_at: f64,
}

impl Throttle {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            open_at: f64::MIN,
        }
    }

    pub fn admit(&mut self, now_ms: f64) -> bool {
        if now_ms < self.open_at {
            return false;
        }
        self.open_at = now_ms + self.window_ms;
        true
    }
}

/// Collapses a burst of calls into one execution.
///
/// Every call re-arms the deadline at `now + wait`. In trailing mode the
/// execution happens when the deadline elapses with no further calls; in
/// immediate mode the first call of a burst executes and the trailing
/// edge is suppressed.
pub struct Debounce {
    wait_ms: f64,
    immediate: bool,
    deadline: Option<f64>,
}

impl Debounce {
    pub fn new(wait_ms: f64, immediate: bool) -> Self {
        Self {
            wait_ms,
            immediate,
            deadline: None,
        }
    }

    /// Records a call and reports whether the leading edge fires now.
    pub fn on_call(&mut self, now_ms: f64) -> bool {
        let leading = self.immediate && self.deadline.is_none();
        self.deadline = Some(now_ms + self.wait_ms);
        leading
    }

    /// Reports whether the trailing edge fires at `now_ms`. A deadline that
    /// has been superseded by a later call stays armed.
    pub fn on_deadline(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                !self.immediate
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_admits_one_call_per_window() {
        let mut gate = Throttle::new(16.0);
        let admitted = (0..100).filter(|_| gate.admit(0.0)).count();

        assert_eq!(admitted, 1);
    }

    #[test]
    fn throttle_first_call_in_window_wins() {
        let mut gate = Throttle::new(16.0);

        assert!(gate.admit(0.0));
        assert!(!gate.admit(15.9));
        assert!(gate.admit(16.0));
        assert!(!gate.admit(20.0));
    }

    #[test]
    fn throttle_reopens_after_idle_period() {
        let mut gate = Throttle::new(16.0);

        assert!(gate.admit(0.0));
        assert!(gate.admit(1_000.0));
    }

    #[test]
    fn debounce_burst_executes_once_fifty_ms_after_last_call() {
        let mut gate = Debounce::new(50.0, false);
        let mut executions = 0;

        for now in [0.0, 10.0, 20.0] {
            if gate.on_call(now) {
                executions += 1;
            }
        }

        assert_eq!(executions, 0, "trailing mode has no leading edge");
        assert!(!gate.on_deadline(69.9), "deadline is 50ms after last call");
        if gate.on_deadline(70.0) {
            executions += 1;
        }
        assert_eq!(executions, 1);
    }

    #[test]
    fn debounce_trailing_edge_fires_only_once() {
        let mut gate = Debounce::new(50.0, false);

        gate.on_call(0.0);
        assert!(gate.on_deadline(50.0));
        assert!(!gate.on_deadline(100.0));
    }

    #[test]
    fn debounce_immediate_fires_leading_edge_and_suppresses_trailing() {
        let mut gate = Debounce::new(50.0, true);

        assert!(gate.on_call(0.0));
        assert!(!gate.on_call(10.0));
        assert!(!gate.on_call(20.0));
        assert!(!gate.on_deadline(70.0));
    }

    #[test]
    fn debounce_immediate_fires_again_after_quiet_period() {
        let mut gate = Debounce::new(50.0, true);

        assert!(gate.on_call(0.0));
        assert!(!gate.on_deadline(50.0));
        assert!(gate.on_call(120.0));
    }
}
