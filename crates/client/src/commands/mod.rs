//! Command implementations for charsheet
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod new;
mod set;
mod show;

pub use check::Check;
pub use new::New;
pub use set::Set;
pub use show::Show;
