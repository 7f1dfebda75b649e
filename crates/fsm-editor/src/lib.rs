pub mod config;
pub mod editor;
pub mod inline;
pub mod input;
pub mod session;
pub mod shortcuts;

pub use config::EditorConfig;
pub use editor::EditorState;
pub use inline::InlineEdit;
pub use input::{InputEvent, Modifiers};
pub use session::{EditSession, Outcome, ToolMode};
pub use shortcuts::{ShortcutAction, ShortcutMap};
