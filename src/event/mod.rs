// Progress notifications
//
// The progression service emits a ProgressEvent after every stored change;
// sinks decide where it goes. EventBus fans events out per user.

pub use bus::EventBus;
pub use events::ProgressEvent;
pub use sink::NotificationSink;

mod bus;
mod events;
mod sink;
