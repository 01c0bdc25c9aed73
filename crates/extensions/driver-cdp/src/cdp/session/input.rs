//! Mouse and keyboard input for CDP page session.

use serde_json::json;
use tracing::trace;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{KeyEventType, MouseButton, MouseEventType};

use super::core::PageSession;

impl PageSession {
    /// Click at page coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseMoved,
                "x": x,
                "y": y,
            })),
        )
        .await?;

        for event in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        trace!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Insert text at the focused element.
    pub async fn type_text(&self, text: &str) -> Result<(), CdpError> {
        self.call("Input.insertText", Some(json!({"text": text})))
            .await?;
        // Length only; the text may be a password.
        trace!("Typed {} characters", text.chars().count());
        Ok(())
    }

    /// Press a key combination such as `Control+a`.
    pub async fn press_key_combo(&self, combo: &str) -> Result<(), CdpError> {
        let parts: Vec<&str> = combo.split('+').collect();
        let (key, modifiers) = match parts.split_last() {
            Some((key, modifiers)) => (*key, Self::get_modifiers(modifiers)),
            None => return Ok(()),
        };

        for event in [KeyEventType::KeyDown, KeyEventType::KeyUp] {
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({
                    "type": event,
                    "key": key,
                    "modifiers": modifiers,
                })),
            )
            .await?;
        }

        Ok(())
    }

    /// Modifier bit flags from modifier names.
    pub(super) fn get_modifiers(modifiers: &[&str]) -> i32 {
        let mut flags = 0;
        for m in modifiers {
            match m.to_lowercase().as_str() {
                "alt" => flags |= 1,
                "control" | "ctrl" => flags |= 2,
                "meta" | "command" | "cmd" => flags |= 4,
                "shift" => flags |= 8,
                _ => {}
            }
        }
        flags
    }
}
