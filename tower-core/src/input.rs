//! Button input events

/// The two buttons on the LCD module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Right,
}

/// Gestures reported for a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Pressed and released before the hold time
    Click,
    /// Held down for at least the hold time
    Hold,
}

/// Button gesture timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonTiming {
    /// Settle time after an edge
    pub debounce_ms: u32,
    /// Presses shorter than this are treated as bounce
    pub click_min_ms: u32,
    /// Presses at least this long are holds
    pub hold_ms: u32,
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self {
            debounce_ms: 20,
            click_min_ms: 30,
            hold_ms: 600,
        }
    }
}

impl ButtonTiming {
    /// Classify a completed press by how long the button was down
    pub fn classify(&self, pressed_ms: u32) -> Option<ButtonEvent> {
        if pressed_ms >= self.hold_ms {
            Some(ButtonEvent::Hold)
        } else if pressed_ms >= self.click_min_ms {
            Some(ButtonEvent::Click)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let timing = ButtonTiming::default();
        assert_eq!(timing.classify(5), None);
        assert_eq!(timing.classify(30), Some(ButtonEvent::Click));
        assert_eq!(timing.classify(599), Some(ButtonEvent::Click));
        assert_eq!(timing.classify(600), Some(ButtonEvent::Hold));
        assert_eq!(timing.classify(5_000), Some(ButtonEvent::Hold));
    }
}
