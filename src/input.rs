//! Raw pointer/key event routing.
//!
//! The application shell feeds its platform input events into
//! [`InputRouter`]; the router asks the overlay sequencer whether a modal
//! currently owns input, otherwise resolves the pointer through the hit
//! tester and dispatches to sprites, the registered click consumer, or
//! the viewport (pan/zoom). Every entry point returns the list of
//! [`RouterEvent`]s the shell should act on — failures are local to one
//! event and surface as an empty list, never as a panic.

use smallvec::SmallVec;
use winit::keyboard::KeyCode;

use crate::geom::ScreenPoint;
use crate::hit_test::{self, HitPolicy};
use crate::keybindings::{Action, KeyBindings, KeyCombo, ModifierFlags};
use crate::model::{ModelQuery, TurnSignal};
use crate::overlay::{AdvanceOutcome, OverlaySequencer, SequencerState};
use crate::sprite::{Sprite, SpriteCommand, SpriteId, SpriteRegistry};
use crate::viewport::Viewport;

/// Zoom target multiplier per wheel notch or zoom-shortcut press.
pub const WHEEL_ZOOM_FACTOR: f32 = 1.25;

/// Minimum pixel distance before an empty-map press becomes a pan drag.
const DRAG_THRESHOLD: f32 = 4.0;

/// Mouse button identifier (decoupled from winit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Outcome of one routed input event, for the application shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouterEvent {
    /// The previous hover target lost the pointer. Always emitted before
    /// the paired `HoverEnter`.
    HoverExit(SpriteId),
    HoverEnter(SpriteId),
    /// A sprite's own click handler fired.
    Command(SpriteCommand),
    /// Wheel motion over a wheel-reactive sprite.
    SpriteWheel { sprite: SpriteId, delta: f32 },
    /// Click on empty map: clear any selection.
    Deselect,
    /// A queue-activated overlay needs exclusive map real estate; the
    /// shell must close any open inspector panel.
    HideInspector,
    /// A global keyboard shortcut fired.
    Shortcut(Action),
}

pub type RouterEvents = SmallVec<[RouterEvent; 2]>;

/// First refusal on resolved sprite clicks — e.g. an open inspector
/// panel that is placing a fleet and wants the next system click as the
/// destination. Return true to consume the click.
pub trait ClickConsumer {
    fn consume_click(&mut self, sprite: &Sprite) -> bool;
}

/// In-flight pan drag started on empty map.
struct Drag {
    origin: ScreenPoint,
    last: ScreenPoint,
    panning: bool,
}

/// Explicit selection/hover state, owned by the router instead of being
/// scattered through ad hoc session globals.
#[derive(Default)]
pub struct InteractionState {
    pub cursor: ScreenPoint,
    /// Sprite currently under the pointer. At most one at a time.
    pub hovered: Option<SpriteId>,
    pressed: Option<SpriteId>,
    drag: Option<Drag>,
}

pub struct InputRouter {
    pub policy: HitPolicy,
    pub state: InteractionState,
    bindings: KeyBindings,
    consumer: Option<Box<dyn ClickConsumer>>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            policy: HitPolicy::default(),
            state: InteractionState::default(),
            bindings: KeyBindings::defaults(),
            consumer: None,
        }
    }

    /// Register (or clear) the click consumer with first refusal.
    pub fn set_consumer(&mut self, consumer: Option<Box<dyn ClickConsumer>>) {
        self.consumer = consumer;
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Pointer moved. Updates the single hover target, pairing every
    /// retarget as exit-then-enter so no highlight can stick, and drives
    /// an active pan drag.
    pub fn on_pointer_move(
        &mut self,
        sprites: &mut SpriteRegistry,
        overlay: &OverlaySequencer,
        viewport: &mut Viewport,
        turn: &dyn TurnSignal,
        point: ScreenPoint,
    ) -> RouterEvents {
        let mut events = RouterEvents::new();
        self.state.cursor = point;

        if let Some(drag) = self.state.drag.as_mut() {
            let dx = point.x - drag.last.x;
            let dy = point.y - drag.last.y;
            if !drag.panning && point.distance_to(drag.origin) >= DRAG_THRESHOLD {
                drag.panning = true;
            }
            if drag.panning {
                // Grab-the-map: the world follows the pointer.
                viewport.pan_screen(-dx, -dy);
            }
            drag.last = point;
            return events;
        }

        if turn.turn_in_progress() {
            // Default input is refused while the turn resolves; release
            // the hover so no highlight survives the wait.
            if let Some(old) = self.state.hovered.take()
                && sprites.set_hovering(old, false)
            {
                events.push(RouterEvent::HoverExit(old));
            }
            return events;
        }

        let masked = overlay.masks_pointer_at(point);
        let hit = hit_test::resolve(point, sprites, viewport, &self.policy, masked);
        if hit != self.state.hovered {
            if let Some(old) = self.state.hovered.take()
                && sprites.set_hovering(old, false)
            {
                events.push(RouterEvent::HoverExit(old));
            }
            if let Some(new) = hit
                && sprites.set_hovering(new, true)
            {
                self.state.hovered = Some(new);
                events.push(RouterEvent::HoverEnter(new));
            }
        }
        events
    }

    /// Pointer button pressed.
    pub fn on_pointer_down(
        &mut self,
        sprites: &mut SpriteRegistry,
        overlay: &mut OverlaySequencer,
        viewport: &mut Viewport,
        model: &dyn ModelQuery,
        turn: &dyn TurnSignal,
        button: PointerButton,
        point: ScreenPoint,
    ) -> RouterEvents {
        let mut events = RouterEvents::new();
        self.state.cursor = point;

        if overlay.state() == SequencerState::Active {
            if overlay.masks_pointer_at(point) {
                // Modal dialogs never leak clicks to the map underneath.
                return events;
            }
            let inside = overlay
                .active()
                .and_then(|o| o.flags.bounds)
                .is_none_or(|b| b.contains(point));
            if inside {
                // The click is the continue affordance.
                if let Some(AdvanceOutcome::NextShown {
                    hide_inspector: true,
                }) = overlay.advance(viewport, sprites, model)
                {
                    events.push(RouterEvent::HideInspector);
                }
                return events;
            }
            if overlay.consumes_all_clicks() {
                return events;
            }
            // Non-consuming overlay: the map is still interactive below.
        }

        if turn.turn_in_progress() {
            return events;
        }

        let hit = hit_test::resolve(point, sprites, viewport, &self.policy, false);
        match hit {
            Some(id) => self.state.pressed = Some(id),
            None if button == PointerButton::Left => {
                self.state.drag = Some(Drag {
                    origin: point,
                    last: point,
                    panning: false,
                });
            }
            None => {}
        }
        events
    }

    /// Pointer button released: completes clicks and pan drags.
    pub fn on_pointer_up(
        &mut self,
        sprites: &mut SpriteRegistry,
        overlay: &OverlaySequencer,
        viewport: &mut Viewport,
        model: &dyn ModelQuery,
        turn: &dyn TurnSignal,
        _button: PointerButton,
        point: ScreenPoint,
    ) -> RouterEvents {
        let mut events = RouterEvents::new();
        self.state.cursor = point;

        if let Some(drag) = self.state.drag.take() {
            if !drag.panning {
                // Press and release on empty map without crossing the
                // drag threshold: plain deselect.
                events.push(RouterEvent::Deselect);
            }
            return events;
        }

        let Some(pressed) = self.state.pressed.take() else {
            return events;
        };
        if turn.turn_in_progress() {
            return events;
        }

        // A click is press + release resolving to the same sprite.
        let masked = overlay.masks_pointer_at(point);
        let hit = hit_test::resolve(point, sprites, viewport, &self.policy, masked);
        if hit != Some(pressed) {
            return events;
        }
        let Some(sprite) = sprites.get(pressed) else {
            return events;
        };
        if !model.can_act_on(sprite.entity) {
            return events;
        }
        if let Some(consumer) = self.consumer.as_mut()
            && consumer.consume_click(sprite)
        {
            return events;
        }
        if let Some(command) = sprite.on_click {
            events.push(RouterEvent::Command(command));
        }
        events
    }

    /// Wheel motion at the last known cursor position. Positive delta
    /// zooms in.
    pub fn on_wheel(
        &mut self,
        sprites: &SpriteRegistry,
        overlay: &OverlaySequencer,
        viewport: &mut Viewport,
        turn: &dyn TurnSignal,
        delta: f32,
    ) -> RouterEvents {
        let mut events = RouterEvents::new();
        if delta == 0.0 || turn.turn_in_progress() {
            return events;
        }
        if overlay.state() == SequencerState::Active && !overlay.allows_zoom() {
            return events;
        }

        let masked = overlay.masks_pointer_at(self.state.cursor);
        let hit = hit_test::resolve(self.state.cursor, sprites, viewport, &self.policy, masked);
        if let Some(id) = hit
            && let Some(sprite) = sprites.get(id)
            && sprite.wheel_reactive
        {
            events.push(RouterEvent::SpriteWheel { sprite: id, delta });
            return events;
        }

        let factor = if delta > 0.0 {
            1.0 / WHEEL_ZOOM_FACTOR
        } else {
            WHEEL_ZOOM_FACTOR
        };
        viewport.zoom_by(factor);
        events
    }

    /// Key pressed. The active overlay gets the key first; the global
    /// shortcut table is the fallback, tried only when the overlay does
    /// not consume all input.
    pub fn on_key(
        &mut self,
        sprites: &mut SpriteRegistry,
        overlay: &mut OverlaySequencer,
        viewport: &mut Viewport,
        model: &dyn ModelQuery,
        turn: &dyn TurnSignal,
        key: KeyCode,
        modifiers: ModifierFlags,
    ) -> RouterEvents {
        let mut events = RouterEvents::new();

        if overlay.state() == SequencerState::Active {
            if let Some(outcome) = overlay.handle_key(key, viewport, sprites, model) {
                if let AdvanceOutcome::NextShown {
                    hide_inspector: true,
                } = outcome
                {
                    events.push(RouterEvent::HideInspector);
                }
                return events;
            }
            if overlay.consumes_all_clicks() {
                return events;
            }
        }
        if turn.turn_in_progress() {
            return events;
        }

        if let Some(action) = self.bindings.lookup(KeyCombo { modifiers, key }) {
            match action {
                Action::ZoomIn => viewport.zoom_by(1.0 / WHEEL_ZOOM_FACTOR),
                Action::ZoomOut => viewport.zoom_by(WHEEL_ZOOM_FACTOR),
                _ => {}
            }
            events.push(RouterEvent::Shortcut(action));
        }
        events
    }

    /// Fixed-period animation tick. Returns true while a zoom animation
    /// is still running. Cosmetic animation is suspended while a turn is
    /// being processed.
    pub fn on_tick(&mut self, viewport: &mut Viewport, turn: &dyn TurnSignal) -> bool {
        if turn.turn_in_progress() {
            return false;
        }
        viewport.zoom_tick()
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}
