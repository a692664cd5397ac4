pub mod context;
pub mod dynamodb;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod notifications;
pub mod pubsub;
pub mod repositories;

pub use context::*;
pub use dynamodb::*;
pub use keys::*;
pub use kv::*;
pub use memory::*;
pub use notifications::*;
pub use pubsub::*;
pub use repositories::*;
