pub mod config;
pub mod error;
pub mod event;
pub mod keys;

pub use config::BanditConfig;
pub use error::{BanditError, BanditResult};
pub use event::{AllocationEvent, EventKind};
pub use keys::KeySpace;
