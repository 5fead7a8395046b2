//! Talk to the remote code-hosting service.

mod client;
pub use client::*;

mod clone;
pub use clone::*;

mod descriptors;
pub use descriptors::*;

mod errors;
pub use errors::*;

mod session;
pub use session::*;
