//! Command layer over the document model.
//!
//! # Responsibility
//! - Translate user intents (`Command`) into document mutations.
//! - Own the per-editor state that commands need: selection, slash menu and
//!   editor policy.
//!
//! # Invariants
//! - Commands never panic on stale input; they report `NoOp` instead.
//! - Only this layer moves the caret; the model never does.
//!
//! # See also
//! - `model::document` for the structural primitives used here.

mod checklist;
pub mod command;
pub mod context;
mod media;
pub mod slash_menu;
mod structure;
mod table;
mod text;
mod title;

pub use command::{Command, CommandOutcome, NoOpReason, SlashCommand, TableCommand};
pub use context::EditorContext;
pub use slash_menu::{place_menu, SlashMenu};
