//! Platform abstraction layer
//!
//! Translates raw pointer and touch coordinates into per-game actions so the
//! simulations never see browser event types.

pub mod input;

pub use input::{
    BubbleAction, CatcherAction, MemoryAction, PointerEvent, PointerKind, bubble_actions,
    catcher_action, memory_action,
};
