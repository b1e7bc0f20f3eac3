//! Global fallback keyboard shortcuts.
//!
//! These are the game-wide shortcuts the router tries after the active
//! overlay has declined a key (and only when the overlay does not consume
//! all input).

use std::collections::HashMap;

use winit::keyboard::KeyCode;

/// Modifier flags for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModifierFlags {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl ModifierFlags {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// A key combination: modifier flags + a physical key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: ModifierFlags,
    pub key: KeyCode,
}

impl KeyCombo {
    /// Plain key, no modifiers.
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            modifiers: ModifierFlags::NONE,
            key,
        }
    }
}

/// Map-wide actions triggerable by keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Finish giving orders and hand the turn to the processor.
    EndTurn,
    /// Recenter the map on the player's home system.
    CenterHome,
    ZoomIn,
    ZoomOut,
    /// Toggle the fuel/command range overlay.
    ToggleRangeOverlay,
    /// Close the topmost transient surface (inspector panel, legend).
    CloseTopmost,
}

/// Configurable keyboard shortcut map.
pub struct KeyBindings {
    map: HashMap<KeyCombo, Action>,
    /// Reverse lookup: action → first combo that maps to it.
    reverse: HashMap<Action, KeyCombo>,
}

impl KeyBindings {
    pub fn defaults() -> Self {
        let mut map = HashMap::new();

        map.insert(KeyCombo::plain(KeyCode::Enter), Action::EndTurn);
        map.insert(KeyCombo::plain(KeyCode::KeyH), Action::CenterHome);
        map.insert(KeyCombo::plain(KeyCode::Equal), Action::ZoomIn);
        map.insert(KeyCombo::plain(KeyCode::Minus), Action::ZoomOut);
        map.insert(KeyCombo::plain(KeyCode::KeyR), Action::ToggleRangeOverlay);
        map.insert(KeyCombo::plain(KeyCode::Escape), Action::CloseTopmost);

        let reverse = Self::build_reverse(&map);
        Self { map, reverse }
    }

    /// Look up the action for a key combination.
    pub fn lookup(&self, combo: KeyCombo) -> Option<Action> {
        self.map.get(&combo).copied()
    }

    /// Display label for an action's binding (e.g. "Enter", "Esc", "H").
    pub fn label_for(&self, action: Action) -> Option<String> {
        self.reverse.get(&action).map(|combo| {
            let mut parts = Vec::new();
            if combo.modifiers.ctrl {
                parts.push("Ctrl");
            }
            if combo.modifiers.alt {
                parts.push("Alt");
            }
            if combo.modifiers.shift {
                parts.push("Shift");
            }
            parts.push(key_name(combo.key));
            parts.join("+")
        })
    }

    fn build_reverse(map: &HashMap<KeyCombo, Action>) -> HashMap<Action, KeyCombo> {
        let mut reverse = HashMap::new();
        for (&combo, &action) in map {
            reverse.entry(action).or_insert(combo);
        }
        reverse
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Human-readable name for a key code.
fn key_name(key: KeyCode) -> &'static str {
    match key {
        KeyCode::Enter => "Enter",
        KeyCode::Escape => "Esc",
        KeyCode::Space => "Space",
        KeyCode::Equal => "+",
        KeyCode::Minus => "-",
        KeyCode::KeyH => "H",
        KeyCode::KeyR => "R",
        KeyCode::Home => "Home",
        KeyCode::PageUp => "PgUp",
        KeyCode::PageDown => "PgDn",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_exist() {
        let kb = KeyBindings::defaults();
        assert_eq!(
            kb.lookup(KeyCombo::plain(KeyCode::Enter)),
            Some(Action::EndTurn)
        );
        assert_eq!(
            kb.lookup(KeyCombo::plain(KeyCode::Escape)),
            Some(Action::CloseTopmost)
        );
        assert_eq!(
            kb.lookup(KeyCombo::plain(KeyCode::Equal)),
            Some(Action::ZoomIn)
        );
    }

    #[test]
    fn unbound_key_returns_none() {
        let kb = KeyBindings::defaults();
        assert_eq!(kb.lookup(KeyCombo::plain(KeyCode::KeyZ)), None);
    }

    #[test]
    fn labels_use_key_names() {
        let kb = KeyBindings::defaults();
        assert_eq!(kb.label_for(Action::EndTurn).as_deref(), Some("Enter"));
        assert_eq!(kb.label_for(Action::CloseTopmost).as_deref(), Some("Esc"));
        assert_eq!(kb.label_for(Action::CenterHome).as_deref(), Some("H"));
    }

    #[test]
    fn modifier_combo_label() {
        let mut map = HashMap::new();
        map.insert(
            KeyCombo {
                modifiers: ModifierFlags {
                    shift: false,
                    ctrl: true,
                    alt: false,
                },
                key: KeyCode::KeyR,
            },
            Action::ToggleRangeOverlay,
        );
        let reverse = KeyBindings::build_reverse(&map);
        let kb = KeyBindings { map, reverse };
        assert_eq!(
            kb.label_for(Action::ToggleRangeOverlay).as_deref(),
            Some("Ctrl+R")
        );
    }
}
