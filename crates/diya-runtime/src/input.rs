//! Pointer input tracking and client-to-NDC mapping

use diya_core::ClientRect;

/// Pointer buttons the scene cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Tracks the cursor and turns press/release pairs into clicks.
///
/// Hosts that report button events without coordinates (windowing systems)
/// feed cursor moves here and read clicks back out.
#[derive(Debug, Default)]
pub struct PointerState {
    /// Current cursor position in client pixels
    pub position: Option<(f64, f64)>,
    primary_down: bool,
    clicks: Vec<(f64, f64)>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_move(&mut self, x: f64, y: f64) {
        self.position = Some((x, y));
    }

    /// Cursor left the region; a release outside it is not a click
    pub fn process_leave(&mut self) {
        self.position = None;
        self.primary_down = false;
    }

    pub fn process_button_down(&mut self, button: PointerButton) {
        if button == PointerButton::Primary {
            self.primary_down = true;
        }
    }

    /// A primary release after a press inside the region records a click
    pub fn process_button_up(&mut self, button: PointerButton) {
        if button != PointerButton::Primary || !self.primary_down {
            return;
        }
        self.primary_down = false;
        if let Some(pos) = self.position {
            self.clicks.push(pos);
        }
    }

    pub fn is_primary_down(&self) -> bool {
        self.primary_down
    }

    /// Take the clicks recorded since the last call
    pub fn drain_clicks(&mut self) -> Vec<(f64, f64)> {
        std::mem::take(&mut self.clicks)
    }
}

/// Map client coordinates to normalized device coordinates through the
/// drawable region's bounding rectangle. Y is flipped so +1 is the top edge.
///
/// Returns `None` for a zero-area rectangle.
pub fn client_to_ndc(rect: &ClientRect, client_x: f64, client_y: f64) -> Option<[f32; 2]> {
    if rect.is_empty() {
        return None;
    }
    let x = ((client_x - rect.left) / rect.width) * 2.0 - 1.0;
    let y = 1.0 - ((client_y - rect.top) / rect.height) * 2.0;
    Some([x as f32, y as f32])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_origin() {
        let rect = ClientRect::new(100.0, 50.0, 800.0, 600.0);
        let (cx, cy) = rect.center();
        let ndc = client_to_ndc(&rect, cx, cy).unwrap();
        assert_eq!(ndc, [0.0, 0.0]);
    }

    #[test]
    fn corners_map_to_unit_square() {
        let rect = ClientRect::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(client_to_ndc(&rect, 10.0, 20.0).unwrap(), [-1.0, 1.0]);
        assert_eq!(client_to_ndc(&rect, 210.0, 120.0).unwrap(), [1.0, -1.0]);
    }

    #[test]
    fn zero_area_rect_is_rejected() {
        let rect = ClientRect::new(0.0, 0.0, 0.0, 0.0);
        assert!(client_to_ndc(&rect, 0.0, 0.0).is_none());
        let rect = ClientRect::new(0.0, 0.0, 640.0, 0.0);
        assert!(client_to_ndc(&rect, 10.0, 0.0).is_none());
    }

    #[test]
    fn press_release_records_click() {
        let mut pointer = PointerState::new();
        pointer.process_move(30.0, 40.0);
        pointer.process_button_down(PointerButton::Primary);
        pointer.process_button_up(PointerButton::Primary);
        assert_eq!(pointer.drain_clicks(), vec![(30.0, 40.0)]);
        assert!(pointer.drain_clicks().is_empty());
    }

    #[test]
    fn secondary_button_and_stray_release_ignored() {
        let mut pointer = PointerState::new();
        pointer.process_move(1.0, 1.0);
        pointer.process_button_down(PointerButton::Secondary);
        pointer.process_button_up(PointerButton::Secondary);
        pointer.process_button_up(PointerButton::Primary);
        assert!(pointer.drain_clicks().is_empty());
    }

    #[test]
    fn leaving_cancels_press() {
        let mut pointer = PointerState::new();
        pointer.process_move(5.0, 5.0);
        pointer.process_button_down(PointerButton::Primary);
        pointer.process_leave();
        pointer.process_button_up(PointerButton::Primary);
        assert!(pointer.drain_clicks().is_empty());
    }
}
