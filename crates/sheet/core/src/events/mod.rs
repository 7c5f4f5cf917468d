//! Change notifications delivered to sheet observers.

pub mod bus;

pub use bus::{Callback, EventBus, SheetEvent, SubscriptionId, Topic};
