//! Session and message synchronization.
//!
//! [`ChatState`] holds the session, the message list, and the pending send.
//! [`update`] applies a [`ChatEvent`] and returns the [`ChatEffect`]s to run;
//! [`effects::execute`] runs one effect against a gateway and produces the
//! completion event. Front-ends choose how effects are scheduled: the TUI
//! spawns them, [`Driver`] awaits them in order.

mod driver;
pub mod effects;
mod message;
mod session;
mod state;
mod submission;
mod task;
mod update;

pub use driver::Driver;
pub use message::{Message, MessageStore, Role};
pub use session::{SessionController, SessionPhase};
pub use state::{ChatEffect, ChatEvent, ChatSettings, ChatState, Notice, SessionPurpose};
pub use submission::{InFlight, SubmissionController};
pub use task::TaskId;
pub use update::update;

#[cfg(test)]
mod tests;
