// Application layer - use cases and orchestration.
// The domain stays synchronous and in-memory; this layer mirrors every
// accepted mutation to storage and undoes it in memory when storage fails.

pub mod error;
pub mod service;
pub mod session;

pub use error::*;
pub use service::*;
pub use session::*;
