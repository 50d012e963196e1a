//! Generic `TextSurface` trait for LCD panels, cockpit screens and any other
//! device that can display text.

use deckwatch_types::AdvisorError;

/// A device owning one or more text surfaces plus a display template.
///
/// Drivers implement this trait and register themselves with a
/// [`DeviceRegistry`][crate::registry::DeviceRegistry].
pub trait TextSurface {
    /// Stable identifier, e.g. `"bridge_lcd"`.
    fn id(&self) -> &str;

    /// The operator-authored template (free text with bracketed tokens).
    fn template(&self) -> &str;

    /// Number of independent surfaces on the device.  Plain panels have one;
    /// cockpits and consoles usually have several.
    fn surface_count(&self) -> usize {
        1
    }

    /// Replace the contents of surface `index` (zero-based) with `text`,
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if `index` is out of range or the
    /// device refuses the write.
    fn write_text(&mut self, index: usize, text: &str) -> Result<(), AdvisorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPanel {
        template: String,
        text: String,
    }

    impl TextSurface for MockPanel {
        fn id(&self) -> &str {
            "panel"
        }
        fn template(&self) -> &str {
            &self.template
        }
        fn write_text(&mut self, index: usize, text: &str) -> Result<(), AdvisorError> {
            if index != 0 {
                return Err(AdvisorError::DeviceFault {
                    device: self.id().to_string(),
                    details: format!("surface {index} does not exist"),
                });
            }
            self.text = text.to_string();
            Ok(())
        }
    }

    #[test]
    fn single_surface_panel_defaults_to_one_surface() {
        let mut panel = MockPanel { template: "TWR: [TWR]".into(), text: String::new() };
        assert_eq!(panel.surface_count(), 1);
        panel.write_text(0, "TWR: 1.00").unwrap();
        assert_eq!(panel.text, "TWR: 1.00");
        assert!(panel.write_text(1, "nope").is_err());
    }
}
