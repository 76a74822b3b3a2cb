//! # Funnel Scenarios
//!
//! End-to-end runs on the virtual clock. Each tier covers one part of the
//! visitor's path; if any tier fails, visitors can get stuck or lose their
//! attribution.
//!
//! ## Tiers
//! - T0: Attribution forwarding
//! - T1: First transition
//! - T2: Preloader and redirect
//! - T3: Failure isolation

use funnel_core::page::{CLASS_ACTIVE, CLASS_FADE_OUT, CLASS_HIDDEN};
use funnel_core::{
    Action, ElementRef, FunnelConfig, FunnelError, MemoryPage, Page, QuizEngine, QuizStage,
    QuizStep, RecordingSink, Timeline, Tracker, TrackingEvent, TrackingSink,
};

const DEST: &str = "https://dest/";
const LANDING: &str = "https://site/?utm_source=fb&foo=bar&gclid=123";

fn timeline_with(page: MemoryPage, tracker: Tracker) -> Timeline<MemoryPage> {
    let engine = QuizEngine::new(FunnelConfig::with_destination(DEST), tracker);
    Timeline::new(engine, page)
}

fn timeline(page: MemoryPage) -> (Timeline<MemoryPage>, RecordingSink) {
    let sink = RecordingSink::new();
    let tl = timeline_with(page, Tracker::new(Box::new(sink.clone())));
    (tl, sink)
}

/// Answer both questions, letting each transition finish.
fn complete(tl: &mut Timeline<MemoryPage>) {
    tl.answer(QuizStep::Step1, "gold", None).expect("step1");
    tl.flush();
    tl.answer(QuizStep::Step2, "travel", None).expect("step2");
    tl.flush();
}

// =============================================================================
// TIER T0: ATTRIBUTION FORWARDING
// =============================================================================

mod t0_attribution {
    use super::*;

    /// T0.1: Allow-listed keys forwarded in allow-list order, others dropped.
    #[test]
    fn forwards_only_attribution() {
        let (mut tl, _) = timeline(MemoryPage::quiz_layout(LANDING));
        complete(&mut tl);

        assert_eq!(
            tl.page().last_navigation(),
            Some("https://dest/?utm_source=fb&gclid=123")
        );
    }

    /// T0.2: No attribution means the bare destination.
    #[test]
    fn bare_destination_without_attribution() {
        let (mut tl, _) = timeline(MemoryPage::quiz_layout("https://site/?ref=newsletter"));
        complete(&mut tl);

        assert_eq!(tl.page().last_navigation(), Some(DEST));
    }

    /// T0.3: Exactly one navigation per visit.
    #[test]
    fn navigates_once() {
        let (mut tl, _) = timeline(MemoryPage::quiz_layout(LANDING));
        complete(&mut tl);

        assert_eq!(tl.page().navigations().len(), 1);
        assert_eq!(tl.stage(), QuizStage::Redirected);
    }
}

// =============================================================================
// TIER T1: FIRST TRANSITION
// =============================================================================

mod t1_first_transition {
    use super::*;

    /// T1.1: After the animation delays, step2 replaces step1.
    #[test]
    fn step1_answer_reveals_step2() {
        let (mut tl, sink) = timeline(MemoryPage::quiz_layout(LANDING));
        tl.answer(QuizStep::Step1, "gold", None).expect("answer");

        tl.advance_time(300);
        assert!(tl.page().has_class(&ElementRef::Step1, CLASS_FADE_OUT));
        assert_eq!(tl.page().displayed_stage(), Some(QuizStage::Step1));

        tl.advance_time(300);
        let page = tl.page();
        assert!(page.has_class(&ElementRef::Step1, CLASS_HIDDEN));
        assert!(!page.has_class(&ElementRef::Step2, CLASS_HIDDEN));
        assert_eq!(page.style(&ElementRef::ProgressBar, "width"), Some("100%"));
        assert_eq!(page.text(&ElementRef::CurrentStep), Some("2"));
        assert_eq!(tl.stage(), QuizStage::Step2);
        assert_eq!(
            sink.events().last(),
            Some(&TrackingEvent::new("quiz_progress", "step2_reached"))
        );
    }

    /// T1.2: Missing step2 stalls the quiz without panicking.
    #[test]
    fn missing_step2_stalls() {
        let mut page = MemoryPage::quiz_layout(LANDING);
        page.remove(&ElementRef::Step2);
        let (mut tl, _) = timeline(page);

        tl.answer(QuizStep::Step1, "gold", None).expect("answer");
        tl.flush();

        assert_eq!(tl.stage(), QuizStage::Step1);
        assert_eq!(tl.pending_timer(), None);
        assert!(tl.page().navigations().is_empty());
        assert_eq!(
            tl.entries()[0].result,
            Err(FunnelError::MissingElement(ElementRef::Step2))
        );
    }

    /// T1.3: The page shows exactly one panel at every point before redirect.
    #[test]
    fn one_panel_visible_throughout() {
        let (mut tl, _) = timeline(MemoryPage::quiz_layout(LANDING));
        tl.answer(QuizStep::Step1, "gold", None).expect("step1");

        for _ in 0..2 {
            tl.advance_time(300);
            assert!(tl.page().displayed_stage().is_some());
        }

        tl.answer(QuizStep::Step2, "travel", None).expect("step2");
        for _ in 0..2 {
            tl.advance_time(300);
            assert!(tl.page().displayed_stage().is_some());
        }
        assert_eq!(tl.page().displayed_stage(), Some(tl.stage()));
    }
}

// =============================================================================
// TIER T2: PRELOADER AND REDIRECT
// =============================================================================

mod t2_preloader {
    use super::*;

    fn at_step2(page: MemoryPage) -> (Timeline<MemoryPage>, RecordingSink) {
        let (mut tl, sink) = timeline(page);
        tl.answer(QuizStep::Step1, "gold", None).expect("step1");
        tl.flush();
        (tl, sink)
    }

    /// T2.1: Preloader shows after one animation delay past the step, and the
    /// redirect waits the full preloader delay.
    #[test]
    fn preloader_dwell_before_redirect() {
        let (mut tl, _) = at_step2(MemoryPage::quiz_layout(LANDING));
        let t0 = tl.now_ms();
        tl.answer(QuizStep::Step2, "travel", None).expect("step2");

        tl.advance_time(600);
        assert!(tl.page().has_class(&ElementRef::Preloader, CLASS_ACTIVE));
        assert!(tl.page().has_class(&ElementRef::ProgressContainer, CLASS_HIDDEN));
        assert_eq!(tl.stage(), QuizStage::Preloader);

        tl.advance_time(2999);
        assert!(tl.page().navigations().is_empty());

        tl.advance_time(1);
        assert_eq!(tl.page().navigations().len(), 1);
        assert_eq!(tl.now_ms() - t0, 3600);
    }

    /// T2.2: Without a preloader, navigation follows the answer after one
    /// animation delay instead of the preloader delay.
    #[test]
    fn missing_preloader_redirects_after_animation_delay() {
        let mut page = MemoryPage::quiz_layout(LANDING);
        page.remove(&ElementRef::Preloader);
        let (mut tl, _) = at_step2(page);

        tl.answer(QuizStep::Step2, "travel", None).expect("step2");
        tl.advance_time(299);
        assert!(tl.page().navigations().is_empty());

        tl.advance_time(1);
        assert_eq!(
            tl.page().last_navigation(),
            Some("https://dest/?utm_source=fb&gclid=123")
        );
        assert_eq!(tl.stage(), QuizStage::Redirected);
        assert_eq!(tl.entries().last().map(|e| e.action), Some(Action::ShowPreloader));
    }

    /// T2.3: Tracking events for a complete visit, in order.
    #[test]
    fn tracking_sequence() {
        let (mut tl, sink) = timeline(MemoryPage::quiz_layout(LANDING));
        tl.start();
        complete(&mut tl);

        let labels: Vec<String> = sink.events().into_iter().map(|e| e.event_label).collect();
        assert_eq!(
            labels,
            vec![
                "page_loaded",
                "step1_gold",
                "step2_reached",
                "step2_travel",
                "showing_results",
                "to_results_page",
            ]
        );
        assert!(sink.events().iter().all(|e| e.event_category == "Quiz_Cartoes"));
    }
}

// =============================================================================
// TIER T3: FAILURE ISOLATION
// =============================================================================

mod t3_failure_isolation {
    use super::*;

    struct Throwing;

    impl TrackingSink for Throwing {
        fn send(&self, _event: &TrackingEvent) -> Result<(), FunnelError> {
            Err(FunnelError::Tracking("gtag threw".to_string()))
        }
    }

    /// T3.1: A throwing tracker neither prevents nor delays anything.
    #[test]
    fn throwing_tracker_keeps_timing() {
        let mut tl = timeline_with(
            MemoryPage::quiz_layout(LANDING),
            Tracker::new(Box::new(Throwing)),
        );
        complete(&mut tl);

        assert_eq!(tl.stage(), QuizStage::Redirected);
        assert_eq!(tl.now_ms(), 600 + 600 + 3000);
        assert!(
            tl.entries()
                .iter()
                .flat_map(|e| &e.degraded)
                .all(|e| matches!(e, FunnelError::Tracking(_)))
        );
    }

    /// T3.2: No tracker at all is a supported setup.
    #[test]
    fn absent_tracker() {
        let mut tl = timeline_with(MemoryPage::quiz_layout(LANDING), Tracker::disabled());
        complete(&mut tl);

        assert_eq!(tl.stage(), QuizStage::Redirected);
        assert!(tl.entries().iter().all(|e| e.degraded.is_empty()));
    }

    /// T3.3: Missing answer control still schedules the transition.
    #[test]
    fn missing_control_is_cosmetic() {
        let (mut tl, _) = timeline(MemoryPage::quiz_layout(LANDING));
        let ghost = ElementRef::OptionButton("removed".into());

        let outcome = tl
            .answer(QuizStep::Step1, "gold", Some(&ghost))
            .expect("answer");
        assert!(outcome.is_degraded());
        tl.flush();
        assert_eq!(tl.stage(), QuizStage::Step2);
    }

    /// T3.4: Repeated clicks do not schedule duplicate transitions.
    #[test]
    fn repeated_clicks_are_ignored() {
        let (mut tl, sink) = timeline(MemoryPage::quiz_layout(LANDING));
        tl.answer(QuizStep::Step1, "gold", None).expect("first");
        tl.advance_time(100);
        let again = tl.answer(QuizStep::Step1, "gold", None);

        assert!(matches!(again, Err(FunnelError::TransitionPending(_))));
        assert_eq!(tl.flush(), 2);
        assert_eq!(sink.actions(), vec!["quiz_answer", "quiz_progress"]);
    }

    /// Page whose step2 panel refuses the exit animation.
    struct StuckStep2(MemoryPage);

    impl Page for StuckStep2 {
        fn exists(&self, element: &ElementRef) -> bool {
            self.0.exists(element)
        }

        fn add_class(&mut self, element: &ElementRef, class: &str) -> Result<(), FunnelError> {
            if *element == ElementRef::Step2 && class == CLASS_FADE_OUT {
                return Err(FunnelError::Page("classList is frozen".to_string()));
            }
            self.0.add_class(element, class)
        }

        fn remove_class(&mut self, element: &ElementRef, class: &str) -> Result<(), FunnelError> {
            self.0.remove_class(element, class)
        }

        fn set_style(
            &mut self,
            element: &ElementRef,
            property: &str,
            value: &str,
        ) -> Result<(), FunnelError> {
            self.0.set_style(element, property, value)
        }

        fn set_text(&mut self, element: &ElementRef, text: &str) -> Result<(), FunnelError> {
            self.0.set_text(element, text)
        }

        fn location(&self) -> &str {
            self.0.location()
        }

        fn navigate(&mut self, url: &str) {
            self.0.navigate(url);
        }
    }

    /// T3.5: A page failure while leaving step2 skips the preloader and
    /// redirects after the fallback delay, keeping attribution.
    #[test]
    fn page_failure_falls_back_to_delayed_redirect() {
        let page = StuckStep2(MemoryPage::quiz_layout("https://site/?gclid=1&foo=bar"));
        let engine = QuizEngine::new(FunnelConfig::with_destination(DEST), Tracker::disabled());
        let mut tl = Timeline::new(engine, page);

        tl.answer(QuizStep::Step1, "gold", None).expect("step1");
        tl.flush();
        tl.answer(QuizStep::Step2, "travel", None).expect("step2");

        tl.advance_time(300);
        let shown = tl.entries().last().expect("show preloader ran");
        assert_eq!(shown.action, Action::ShowPreloader);
        assert_eq!(shown.at_ms, 900);
        assert!(matches!(shown.degraded.as_slice(), [FunnelError::Page(_)]));

        tl.advance_time(999);
        assert!(tl.page().0.navigations().is_empty());

        tl.advance_time(1);
        let actions: Vec<(Action, u64)> = tl.entries().iter().map(|e| (e.action, e.at_ms)).collect();
        assert_eq!(
            actions,
            vec![
                (Action::EnterStep2, 300),
                (Action::RevealStep2, 600),
                (Action::ShowPreloader, 900),
                (Action::Redirect, 1900),
            ]
        );
        assert_eq!(tl.stage(), QuizStage::Redirected);
        assert!(!tl.page().0.has_class(&ElementRef::Preloader, CLASS_ACTIVE));
        assert_eq!(tl.page().0.last_navigation(), Some("https://dest/?gclid=1"));
    }
}
