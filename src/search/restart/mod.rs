//! Restart monitors: count failures and restart the search from its root when a schedule step
//! is reached.

mod constant_restart;
mod luby_restart;

pub use constant_restart::ConstantRestart;
pub use luby_restart::LubyRestart;
