//! Interactive front-end: prompts, spinner, rendering, pickers, and the
//! main menu

pub mod display;
pub mod menu;
pub mod picker;
pub mod prompt;
pub mod spinner;

pub use menu::{MenuChoice, Session};
pub use prompt::{ScriptedPrompter, StdinPrompter, UserPrompter};
pub use spinner::Spinner;
