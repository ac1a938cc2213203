//! # Events Module
//!
//! Progress reporting for pipeline runs.
//!
//! ## Design
//! The core library emits events through channels, so any front end
//! (CLI, GUI, tests) can subscribe without the core knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = events::channel();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Stage(StageEvent::ItemDigested { stage }) = event {
//!             println!("{stage:?} finished an item");
//!         }
//!     }
//! });
//!
//! fingerprinter.run_with_events(&batch, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{channel, null_sender, EventReceiver, EventSender};
pub use types::*;
