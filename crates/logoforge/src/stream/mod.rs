//! Live gallery stream: bounded rings fed by a cooperative timer.

mod item;
mod live;
mod ring;
mod scheduler;

pub use item::{ActivityLogEntry, GalleryItem, LogStatus, AGENTS, STYLES};
pub use live::{LiveStream, StreamClosed, StreamCommand};
pub use ring::RingBuffer;
pub use scheduler::{StreamCore, StreamSnapshot, StreamState, MAX_COUNTER_STEP};
