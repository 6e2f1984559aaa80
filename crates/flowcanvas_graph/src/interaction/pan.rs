// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pan gesture.

use super::{PointerButton, PointerEvent};
use crate::config::PanModifier;
use crate::transform::ViewTransform;
use egui::{Pos2, Vec2};

/// Pan drag state. Works in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PanDrag {
    /// No pan
    #[default]
    Idle,
    /// The view follows the pointer
    Panning {
        /// Last screen position seen
        last: Pos2,
    },
}

impl PanDrag {
    /// Secondary and middle buttons always pan; the primary button pans
    /// while `modifier` is held.
    pub fn qualifies(event: &PointerEvent, modifier: PanModifier) -> bool {
        match event.button {
            PointerButton::Secondary | PointerButton::Middle => true,
            PointerButton::Primary => modifier.is_held(&event.modifiers),
            PointerButton::Extra1 | PointerButton::Extra2 => false,
        }
    }

    /// Start panning at a screen position
    pub fn begin(screen: Pos2) -> Self {
        Self::Panning { last: screen }
    }

    /// Check if a pan is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    /// Apply pointer movement to `view`. Returns `true` if the view moved.
    pub fn update(&mut self, view: &mut ViewTransform, screen: Pos2) -> bool {
        let Self::Panning { last } = self else {
            return false;
        };
        let delta = screen - *last;
        *last = screen;
        if delta == Vec2::ZERO {
            return false;
        }
        view.pan_by(delta);
        true
    }

    /// End the pan. Returns `true` if one was in progress.
    pub fn end(&mut self) -> bool {
        std::mem::take(self).is_active()
    }
}

/// Scroll the view with an unmodified wheel gesture
pub fn wheel_pan(view: &mut ViewTransform, delta: Vec2) {
    view.pan_by(-delta);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Modifiers;

    #[test]
    fn test_qualifying_buttons() {
        let press = |button, modifiers| {
            PointerEvent::new(Pos2::ZERO)
                .with_button(button)
                .with_modifiers(modifiers)
        };
        let qualifies = |button, modifiers| {
            PanDrag::qualifies(&press(button, modifiers), PanModifier::Shift)
        };
        assert!(qualifies(PointerButton::Secondary, Modifiers::NONE));
        assert!(qualifies(PointerButton::Middle, Modifiers::NONE));
        assert!(qualifies(PointerButton::Primary, Modifiers::SHIFT));
        assert!(!qualifies(PointerButton::Primary, Modifiers::NONE));
        assert!(!qualifies(PointerButton::Primary, Modifiers::ALT));
    }

    #[test]
    fn test_pan_accumulates_deltas() {
        let mut view = ViewTransform::default();
        let mut pan = PanDrag::begin(Pos2::new(10.0, 10.0));
        assert!(pan.update(&mut view, Pos2::new(30.0, 5.0)));
        assert!(pan.update(&mut view, Pos2::new(35.0, 15.0)));
        assert!(!pan.update(&mut view, Pos2::new(35.0, 15.0)));
        assert_eq!(view.pan_offset, Vec2::new(25.0, 5.0));

        assert!(pan.end());
        assert!(!pan.update(&mut view, Pos2::new(100.0, 100.0)));
        assert_eq!(view.pan_offset, Vec2::new(25.0, 5.0));
        assert!(!pan.end());
    }

    #[test]
    fn test_wheel_pan_subtracts_delta() {
        let mut view = ViewTransform::new(1.0, Vec2::new(5.0, 5.0));
        wheel_pan(&mut view, Vec2::new(2.0, 40.0));
        assert_eq!(view.pan_offset, Vec2::new(3.0, -35.0));
    }
}
