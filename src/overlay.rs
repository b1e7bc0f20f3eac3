//! Modal turn-notice overlays and the sequencer that serializes them.
//!
//! Turn resolution produces interrupts ("3 ships completed", "2 systems
//! scouted") that must each be acknowledged before the next turn can
//! proceed. An [`Overlay`] is one such interrupt: a kind tag, declarative
//! input-gating flags, and an ordered payload of model entities the user
//! steps through. The [`OverlaySequencer`] guarantees at most one overlay
//! is ever active; further `show` calls queue FIFO behind it.
//!
//! Advancing is a one-shot transition: every function here completes it
//! synchronously, so observers only ever see `Inactive` or `Active`.

use std::collections::VecDeque;

use winit::keyboard::KeyCode;

use crate::geom::{ScreenPoint, ScreenRect};
use crate::model::{EntityRef, ModelQuery};
use crate::sprite::SpriteRegistry;
use crate::viewport::Viewport;

/// Runs when an overlay (and everything queued behind it from the same
/// event) has been cleared, unblocking background turn processing.
pub type ResumeHook = Box<dyn FnOnce()>;

/// What kind of turn interrupt this overlay presents. Rendering of each
/// kind is application content; the core only sequences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    TurnSummary,
    SystemsScouted,
    ShipsConstructed,
    CombatReport,
    EspionageChoice,
    BombardmentPrompt,
    /// App-defined kind outside the built-in set.
    Custom(u16),
}

/// Declarative input-gating contract of one overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayFlags {
    /// When true, keys/clicks the overlay declines are swallowed instead
    /// of falling through to global shortcuts or the map.
    pub consumes_all_clicks: bool,
    /// Screen region the overlay occupies, if it has one.
    pub bounds: Option<ScreenRect>,
    /// Swallow pointer input outside `bounds` (classic modal dialog).
    pub masks_pointer_outside_bounds: bool,
    /// Whether map zoom (wheel, zoom ticks) stays enabled.
    pub allows_zoom: bool,
    /// Suppress the default "turn N" banner while active.
    pub suppresses_turn_banner: bool,
    /// The overlay needs exclusive map real estate: hide the inspector.
    pub hides_inspector: bool,
    /// Recenter the viewport on each payload item as the user advances.
    pub focus_items: bool,
    /// Vertical scale to ease toward when focusing an item.
    pub focus_scale: Option<f32>,
}

impl Default for OverlayFlags {
    fn default() -> Self {
        Self {
            consumes_all_clicks: true,
            bounds: None,
            masks_pointer_outside_bounds: false,
            allows_zoom: false,
            suppresses_turn_banner: true,
            hides_inspector: false,
            focus_items: false,
            focus_scale: None,
        }
    }
}

/// One modal turn interrupt. Generic over its payload: an ordered,
/// possibly-empty list of entity handles with stable identity. Empty
/// payloads auto-skip inside `show` — the overlay is never rendered.
pub struct Overlay {
    pub kind: OverlayKind,
    pub flags: OverlayFlags,
    items: Vec<EntityRef>,
    index: usize,
    resume: Option<ResumeHook>,
}

impl Overlay {
    pub fn new(kind: OverlayKind, flags: OverlayFlags, items: Vec<EntityRef>) -> Self {
        Self {
            kind,
            flags,
            items,
            index: 0,
            resume: None,
        }
    }

    /// Attach the turn-resumption hook of the triggering game event.
    pub fn with_resume(mut self, hook: ResumeHook) -> Self {
        self.resume = Some(hook);
        self
    }

    /// The payload item currently presented.
    pub fn current_item(&self) -> Option<EntityRef> {
        self.items.get(self.index).copied()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Observable sequencer state. Never undefined: `Inactive` is the
/// sentinel when no overlay is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Inactive,
    Active,
}

/// Result of a `show` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The overlay is active and owns input. When `hide_inspector` is
    /// set the caller must close any independent inspector panel.
    Shown { hide_inspector: bool },
    /// Empty payload: skipped synchronously before any paint; the resume
    /// hook has already run.
    Skipped,
    /// Another overlay is active; this one is queued FIFO behind it.
    Queued,
}

/// Result of `advance`/`dismiss`: what the sequencer transitioned to.
/// Carries the inspector requirement of a queue-activated overlay so the
/// shell sees the same side effects as a direct `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The active overlay stepped to its next payload item.
    Stepped,
    /// The overlay finished and nothing was left queued.
    Finished,
    /// The overlay finished and a queued overlay activated in its place.
    NextShown { hide_inspector: bool },
}

pub struct OverlaySequencer {
    active: Option<Overlay>,
    queue: VecDeque<Overlay>,
}

impl OverlaySequencer {
    pub fn new() -> Self {
        Self {
            active: None,
            queue: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SequencerState {
        if self.active.is_some() {
            SequencerState::Active
        } else {
            SequencerState::Inactive
        }
    }

    pub fn active(&self) -> Option<&Overlay> {
        self.active.as_ref()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the active overlay masks pointer input at this location.
    pub fn masks_pointer_at(&self, p: ScreenPoint) -> bool {
        let Some(overlay) = &self.active else {
            return false;
        };
        if !overlay.flags.masks_pointer_outside_bounds {
            return false;
        }
        match overlay.flags.bounds {
            Some(bounds) => !bounds.contains(p),
            None => true,
        }
    }

    pub fn allows_zoom(&self) -> bool {
        self.active.as_ref().is_none_or(|o| o.flags.allows_zoom)
    }

    pub fn consumes_all_clicks(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|o| o.flags.consumes_all_clicks)
    }

    pub fn suppresses_turn_banner(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|o| o.flags.suppresses_turn_banner)
    }

    /// Present an overlay. Empty payloads are skipped synchronously —
    /// the caller never observes a flash of an empty overlay. A `show`
    /// while another overlay is active queues FIFO; the observed design
    /// only triggers overlays from serialized turn events, so this path
    /// is logged as unexpected.
    pub fn show(
        &mut self,
        overlay: Overlay,
        viewport: &mut Viewport,
        sprites: &mut SpriteRegistry,
        model: &dyn ModelQuery,
    ) -> ShowOutcome {
        if self.active.is_some() {
            log::warn!(
                "overlay {:?} shown while {:?} is active; queueing",
                overlay.kind,
                self.active.as_ref().map(|o| o.kind),
            );
            self.queue.push_back(overlay);
            return ShowOutcome::Queued;
        }
        self.activate(overlay, viewport, sprites, model)
    }

    /// Continue to the next payload item, or finish the overlay when the
    /// last item was showing. Finishing runs the resume hook and then
    /// activates the next queued overlay, if any; `NextShown` reports
    /// that overlay's inspector requirement. `None` when nothing was
    /// active.
    pub fn advance(
        &mut self,
        viewport: &mut Viewport,
        sprites: &mut SpriteRegistry,
        model: &dyn ModelQuery,
    ) -> Option<AdvanceOutcome> {
        let overlay = self.active.as_mut()?;
        if overlay.index + 1 < overlay.items.len() {
            overlay.index += 1;
            Self::focus_current(overlay, viewport, model);
            Some(AdvanceOutcome::Stepped)
        } else {
            Some(self.finish_active(viewport, sprites, model))
        }
    }

    /// Explicit dismissal (Escape / window close affordance): drop any
    /// remaining payload items. The resume hook still runs — turn
    /// processing must never be left blocked.
    pub fn dismiss(
        &mut self,
        viewport: &mut Viewport,
        sprites: &mut SpriteRegistry,
        model: &dyn ModelQuery,
    ) -> Option<AdvanceOutcome> {
        if self.active.is_some() {
            Some(self.finish_active(viewport, sprites, model))
        } else {
            None
        }
    }

    /// Keys the sequencer understands for every overlay kind. `Some` when
    /// consumed, carrying the transition taken; the router applies the
    /// `consumes_all_clicks` fallback rule for the rest.
    pub fn handle_key(
        &mut self,
        key: KeyCode,
        viewport: &mut Viewport,
        sprites: &mut SpriteRegistry,
        model: &dyn ModelQuery,
    ) -> Option<AdvanceOutcome> {
        match key {
            KeyCode::Escape => self.dismiss(viewport, sprites, model),
            KeyCode::Enter | KeyCode::Space => self.advance(viewport, sprites, model),
            _ => None,
        }
    }

    fn activate(
        &mut self,
        mut overlay: Overlay,
        viewport: &mut Viewport,
        sprites: &mut SpriteRegistry,
        model: &dyn ModelQuery,
    ) -> ShowOutcome {
        if overlay.items.is_empty() {
            // Auto-skip: zero pending notices, nothing to acknowledge.
            log::debug!("auto-skipping empty {:?} overlay", overlay.kind);
            if let Some(hook) = overlay.resume.take() {
                hook();
            }
            return ShowOutcome::Skipped;
        }

        overlay.index = 0;
        Self::focus_current(&overlay, viewport, model);
        // Transient sprite lists are stale the moment a modal takes the map.
        sprites.begin_frame();

        let hide_inspector = overlay.flags.hides_inspector;
        self.active = Some(overlay);
        ShowOutcome::Shown { hide_inspector }
    }

    /// `Active → Advancing → Inactive`, then drain the queue until an
    /// overlay actually shows (queued empty payloads skip in turn).
    fn finish_active(
        &mut self,
        viewport: &mut Viewport,
        sprites: &mut SpriteRegistry,
        model: &dyn ModelQuery,
    ) -> AdvanceOutcome {
        if let Some(mut overlay) = self.active.take()
            && let Some(hook) = overlay.resume.take()
        {
            hook();
        }
        while let Some(next) = self.queue.pop_front() {
            if let ShowOutcome::Shown { hide_inspector } =
                self.activate(next, viewport, sprites, model)
            {
                return AdvanceOutcome::NextShown { hide_inspector };
            }
        }
        AdvanceOutcome::Finished
    }

    fn focus_current(overlay: &Overlay, viewport: &mut Viewport, model: &dyn ModelQuery) {
        if !overlay.flags.focus_items {
            return;
        }
        if let Some(item) = overlay.current_item()
            && let Some(pos) = model.position_of(item)
        {
            viewport.recenter_on(pos);
            if let Some(scale) = overlay.flags.focus_scale {
                viewport.request_zoom(scale);
            }
        }
    }
}

impl Default for OverlaySequencer {
    fn default() -> Self {
        Self::new()
    }
}
