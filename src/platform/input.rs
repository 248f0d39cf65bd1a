//! Pointer to action mapping
//!
//! Mouse and touch events are reduced to a [`PointerEvent`] in field
//! coordinates by the host; each game then reads the actions it cares about.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse moved (no button needed)
    Move,
    /// Mouse press or touch start
    Down,
    /// Touch moved while held
    Drag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Position relative to the canvas top-left
    pub pos: Vec2,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, pos: Vec2) -> Self {
        Self { kind, pos }
    }

    /// Build from client coordinates and the canvas' client rectangle origin
    pub fn from_client(kind: PointerKind, client_x: f32, client_y: f32, left: f32, top: f32) -> Self {
        Self::new(kind, Vec2::new(client_x - left, client_y - top))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleAction {
    Aim(Vec2),
    Fire,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatcherAction {
    MoveBasket(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemoryAction {
    Pick(Vec2),
}

/// Move aims; a press or tap aims and then fires
pub fn bubble_actions(event: PointerEvent) -> Vec<BubbleAction> {
    match event.kind {
        PointerKind::Move | PointerKind::Drag => vec![BubbleAction::Aim(event.pos)],
        PointerKind::Down => vec![BubbleAction::Aim(event.pos), BubbleAction::Fire],
    }
}

/// The basket follows hover and touch drags
pub fn catcher_action(event: PointerEvent) -> Option<CatcherAction> {
    match event.kind {
        PointerKind::Move | PointerKind::Drag => Some(CatcherAction::MoveBasket(event.pos.x)),
        PointerKind::Down => None,
    }
}

/// Cards are picked on press
pub fn memory_action(event: PointerEvent) -> Option<MemoryAction> {
    match event.kind {
        PointerKind::Down => Some(MemoryAction::Pick(event.pos)),
        PointerKind::Move | PointerKind::Drag => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_offset() {
        let ev = PointerEvent::from_client(PointerKind::Down, 130.0, 90.0, 30.0, 40.0);
        assert_eq!(ev.pos, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_bubble_tap_aims_then_fires() {
        let pos = Vec2::new(10.0, 20.0);
        assert_eq!(
            bubble_actions(PointerEvent::new(PointerKind::Down, pos)),
            vec![BubbleAction::Aim(pos), BubbleAction::Fire]
        );
        assert_eq!(
            bubble_actions(PointerEvent::new(PointerKind::Move, pos)),
            vec![BubbleAction::Aim(pos)]
        );
    }

    #[test]
    fn test_catcher_and_memory_mapping() {
        let pos = Vec2::new(75.0, 300.0);
        assert_eq!(
            catcher_action(PointerEvent::new(PointerKind::Drag, pos)),
            Some(CatcherAction::MoveBasket(75.0))
        );
        assert_eq!(catcher_action(PointerEvent::new(PointerKind::Down, pos)), None);
        assert_eq!(
            memory_action(PointerEvent::new(PointerKind::Down, pos)),
            Some(MemoryAction::Pick(pos))
        );
        assert_eq!(memory_action(PointerEvent::new(PointerKind::Move, pos)), None);
    }
}
