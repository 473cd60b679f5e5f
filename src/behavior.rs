//! Decision logic for the page behaviors, kept free of DOM types so the
//! geometry and state machines test natively.

const SCROLL_LOOKAHEAD_PX: f64 = 100.0;
const NAVBAR_THRESHOLD_PX: f64 = 100.0;
const REVEAL_VIEWPORT_FRACTION: f64 = 0.8;
const DESKTOP_MIN_VIEWPORT_PX: f64 = 768.0;

pub const SENDING_DURATION_MS: u32 = 1_000;
pub const SENT_DURATION_MS: u32 = 2_000;

pub struct SectionSpan {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Picks the section whose span contains the biased scroll position.
/// Every section is scanned; a later match overwrites an earlier one, so
/// with overlapping spans the last section in document order wins.
pub fn active_section(scroll_y: f64, sections: &[SectionSpan]) -> Option<&str> {
    let probe = scroll_y + SCROLL_LOOKAHEAD_PX;
    let mut current = None;

    for section in sections {
        if probe >= section.top && probe < section.top + section.height {
            current = Some(section.id.as_str());
        }
    }

    current
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NavbarMode {
    Top,
    Scrolled,
}

impl NavbarMode {
    pub fn for_offset(scroll_y: f64) -> Self {
        if scroll_y > NAVBAR_THRESHOLD_PX {
            Self::Scrolled
        } else {
            Self::Top
        }
    }
}

/// An element is due to fade in once its viewport-relative top crosses
/// above 80% of the viewport height.
pub fn reveal_due(viewport_top: f64, viewport_height: f64) -> bool {
    viewport_top < viewport_height * REVEAL_VIEWPORT_FRACTION
}

/// Transform for decorative shape `index` at the given scroll offset.
/// Divisions keep the published reference points exact: offset 1000 and
/// index 2 give `translateY(300px) rotate(50deg)`.
pub fn parallax_transform(scroll_y: f64, index: usize) -> String {
    let translate = scroll_y * (index + 1) as f64 / 10.0;
    let rotate = scroll_y / 20.0;

    format!("translateY({translate}px) rotate({rotate}deg)")
}

pub fn cursor_enabled(viewport_width: f64) -> bool {
    viewport_width > DESKTOP_MIN_VIEWPORT_PX
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubmitPhase {
    Idle,
    Sending,
    Sent,
}

impl SubmitPhase {
    /// A submit event only starts the machine from rest; events arriving
    /// mid-flight are ignored.
    pub fn on_submit(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Sending),
            Self::Sending | Self::Sent => None,
        }
    }

    /// Dwell time in the current phase and the phase that follows it.
    pub fn scheduled_next(self) -> Option<(u32, Self)> {
        match self {
            Self::Idle => None,
            Self::Sending => Some((SENDING_DURATION_MS, Self::Sent)),
            Self::Sent => Some((SENT_DURATION_MS, Self::Idle)),
        }
    }

    /// Button label override; `None` restores the original caption.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Sending => Some("Sending..."),
            Self::Sent => Some("Message Sent!"),
        }
    }

    pub fn disables_button(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(raw: &[(&str, f64, f64)]) -> Vec<SectionSpan> {
        raw.iter()
            .map(|(id, top, height)| SectionSpan {
                id: (*id).to_string(),
                top: *top,
                height: *height,
            })
            .collect()
    }

    #[test]
    fn active_section_applies_lookahead_bias() {
        let sections = spans(&[("hero", 0.0, 600.0), ("about", 600.0, 400.0)]);

        assert_eq!(active_section(0.0, &sections), Some("hero"));
        assert_eq!(active_section(500.0, &sections), Some("about"));
    }

    #[test]
    fn active_section_prefers_last_match_in_document_order() {
        let sections = spans(&[
            ("hero", 0.0, 600.0),
            ("overlay", 0.0, 600.0),
            ("about", 600.0, 400.0),
        ]);

        assert_eq!(active_section(0.0, &sections), Some("overlay"));
    }

    #[test]
    fn active_section_miss_selects_nothing() {
        let sections = spans(&[("hero", 500.0, 100.0)]);

        assert_eq!(active_section(0.0, &sections), None);
        assert_eq!(active_section(500.0, &sections), None, "span end excluded");
    }

    #[test]
    fn active_section_span_end_is_exclusive() {
        let sections = spans(&[("hero", 0.0, 100.0), ("about", 100.0, 100.0)]);

        // Probe lands exactly on the boundary shared by both spans.
        assert_eq!(active_section(0.0, &sections), Some("about"));
    }

    #[test]
    fn navbar_mode_switches_strictly_above_threshold() {
        assert_eq!(NavbarMode::for_offset(0.0), NavbarMode::Top);
        assert_eq!(NavbarMode::for_offset(100.0), NavbarMode::Top);
        assert_eq!(NavbarMode::for_offset(100.1), NavbarMode::Scrolled);
        assert_eq!(NavbarMode::for_offset(5_000.0), NavbarMode::Scrolled);
    }

    #[test]
    fn reveal_threshold_sits_at_four_fifths_of_viewport() {
        assert!(reveal_due(799.9, 1_000.0));
        assert!(!reveal_due(800.0, 1_000.0));
        assert!(reveal_due(-50.0, 1_000.0), "elements above the fold count");
    }

    #[test]
    fn reveal_is_monotonic_across_polling_passes() {
        let viewport = 1_000.0;
        let mut revealed = [false, false];

        for (flag, top) in revealed.iter_mut().zip([700.0, 900.0]) {
            if reveal_due(top, viewport) {
                *flag = true;
            }
        }
        assert_eq!(revealed, [true, false]);

        // Scrolling back up pushes tops below the threshold again; flags
        // are only ever set, never cleared.
        for (flag, top) in revealed.iter_mut().zip([900.0, 1_100.0]) {
            if reveal_due(top, viewport) {
                *flag = true;
            }
        }
        assert_eq!(revealed, [true, false]);
    }

    #[test]
    fn parallax_transform_round_trips_reference_points() {
        assert_eq!(parallax_transform(0.0, 0), "translateY(0px) rotate(0deg)");
        assert_eq!(
            parallax_transform(1_000.0, 2),
            "translateY(300px) rotate(50deg)"
        );
    }

    #[test]
    fn parallax_speed_scales_with_shape_index() {
        assert_eq!(
            parallax_transform(200.0, 0),
            "translateY(20px) rotate(10deg)"
        );
        assert_eq!(
            parallax_transform(200.0, 3),
            "translateY(80px) rotate(10deg)"
        );
    }

    #[test]
    fn cursor_only_enabled_on_viewports_wider_than_768() {
        assert!(!cursor_enabled(480.0));
        assert!(!cursor_enabled(768.0));
        assert!(cursor_enabled(768.1));
    }

    #[test]
    fn submit_phase_walks_idle_sending_sent_idle() {
        let sending = SubmitPhase::Idle.on_submit().expect("idle accepts submit");
        assert_eq!(sending, SubmitPhase::Sending);

        let (sending_dwell, sent) = sending.scheduled_next().expect("sending advances");
        assert_eq!(sending_dwell, 1_000);
        assert_eq!(sent, SubmitPhase::Sent);

        let (sent_dwell, idle) = sent.scheduled_next().expect("sent advances");
        assert_eq!(sent_dwell, 2_000);
        assert_eq!(idle, SubmitPhase::Idle);
        assert_eq!(idle.scheduled_next(), None);
    }

    #[test]
    fn submit_phase_ignores_reentrant_submits() {
        assert_eq!(SubmitPhase::Sending.on_submit(), None);
        assert_eq!(SubmitPhase::Sent.on_submit(), None);
    }

    #[test]
    fn submit_button_disabled_during_sending_and_sent_only() {
        assert!(!SubmitPhase::Idle.disables_button());
        assert!(SubmitPhase::Sending.disables_button());
        assert!(SubmitPhase::Sent.disables_button());
    }

    #[test]
    fn submit_labels_match_phase() {
        assert_eq!(SubmitPhase::Idle.label(), None);
        assert_eq!(SubmitPhase::Sending.label(), Some("Sending..."));
        assert_eq!(SubmitPhase::Sent.label(), Some("Message Sent!"));
    }
}
