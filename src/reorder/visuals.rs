/// Per-session ownership of the floating ghost and the insertion line
///
/// Each drag session owns a `SessionVisuals`. The ghost and the placeholder
/// are shown lazily on first use and hidden again when the session value is
/// dropped, whichever way the session ends.
use std::cell::RefCell;
use std::rc::Rc;

use crate::reorder::traits::DragVisuals;

pub struct SessionVisuals {
    renderer: Rc<RefCell<dyn DragVisuals>>,
    ghost_width: f64,
    ghost_x: Option<f64>,
    placeholder: Option<usize>,
}

impl SessionVisuals {
    pub fn new(renderer: Rc<RefCell<dyn DragVisuals>>, ghost_width: f64) -> Self {
        Self {
            renderer,
            ghost_width,
            ghost_x: None,
            placeholder: None,
        }
    }

    pub fn ghost_width(&self) -> f64 {
        self.ghost_width
    }

    pub fn ghost_x(&self) -> Option<f64> {
        self.ghost_x
    }

    pub fn placeholder(&self) -> Option<usize> {
        self.placeholder
    }

    pub fn move_ghost(&mut self, x: f64) {
        let mut renderer = self.renderer.borrow_mut();
        if self.ghost_x.is_some() {
            renderer.move_ghost(x);
        } else {
            renderer.show_ghost(x, self.ghost_width);
        }
        self.ghost_x = Some(x);
    }

    pub fn place_placeholder(&mut self, field_index: usize, x: f64) {
        self.renderer.borrow_mut().show_placeholder(field_index, x);
        self.placeholder = Some(field_index);
    }
}

impl Drop for SessionVisuals {
    fn drop(&mut self) {
        let Ok(mut renderer) = self.renderer.try_borrow_mut() else {
            return;
        };
        if self.placeholder.take().is_some() {
            renderer.hide_placeholder();
        }
        if self.ghost_x.take().is_some() {
            renderer.hide_ghost();
        }
    }
}

/// One call made on a `RecordingVisuals`
#[derive(Debug, Clone, PartialEq)]
pub enum VisualCall {
    ShowGhost { x: f64, width: f64 },
    MoveGhost { x: f64 },
    HideGhost,
    ShowPlaceholder { field_index: usize, x: f64 },
    HidePlaceholder,
}

/// Headless renderer that records every call. Used by the replay tool and
/// in tests.
#[derive(Debug, Default)]
pub struct RecordingVisuals {
    pub calls: Vec<VisualCall>,
    pub ghost: Option<(f64, f64)>,
    pub placeholder: Option<(usize, f64)>,
}

impl RecordingVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn last_placeholder_index(&self) -> Option<usize> {
        self.calls.iter().rev().find_map(|call| match call {
            VisualCall::ShowPlaceholder { field_index, .. } => Some(*field_index),
            _ => None,
        })
    }
}

impl DragVisuals for RecordingVisuals {
    fn show_ghost(&mut self, x: f64, width: f64) {
        self.calls.push(VisualCall::ShowGhost { x, width });
        self.ghost = Some((x, width));
    }

    fn move_ghost(&mut self, x: f64) {
        self.calls.push(VisualCall::MoveGhost { x });
        if let Some((_, width)) = self.ghost {
            self.ghost = Some((x, width));
        }
    }

    fn hide_ghost(&mut self) {
        self.calls.push(VisualCall::HideGhost);
        self.ghost = None;
    }

    fn show_placeholder(&mut self, field_index: usize, x: f64) {
        self.calls.push(VisualCall::ShowPlaceholder { field_index, x });
        self.placeholder = Some((field_index, x));
    }

    fn hide_placeholder(&mut self) {
        self.calls.push(VisualCall::HidePlaceholder);
        self.placeholder = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ghost_shown_lazily_then_moved() {
        let recorder = RecordingVisuals::shared();
        let mut visuals = SessionVisuals::new(recorder.clone(), 40.0);
        visuals.move_ghost(10.0);
        visuals.move_ghost(12.0);

        let calls = recorder.borrow().calls.clone();
        assert_eq!(
            calls,
            vec![
                VisualCall::ShowGhost { x: 10.0, width: 40.0 },
                VisualCall::MoveGhost { x: 12.0 },
            ]
        );
    }

    #[test]
    fn test_drop_releases_everything_shown() {
        let recorder = RecordingVisuals::shared();
        {
            let mut visuals = SessionVisuals::new(recorder.clone(), 40.0);
            visuals.move_ghost(10.0);
            visuals.place_placeholder(2, 21.0);
        }
        let r = recorder.borrow();
        assert!(r.ghost.is_none());
        assert!(r.placeholder.is_none());
        assert!(r.calls.contains(&VisualCall::HideGhost));
        assert!(r.calls.contains(&VisualCall::HidePlaceholder));
    }

    #[test]
    fn test_drop_without_use_is_silent() {
        let recorder = RecordingVisuals::shared();
        drop(SessionVisuals::new(recorder.clone(), 40.0));
        assert!(recorder.borrow().calls.is_empty());
    }
}
