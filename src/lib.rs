//! Per-recipient expansion of command trees into the overload lists sent in
//! "available commands" packets.
//!
//! [`overloads::expand_overloads`] is the core; [`hook::PacketHook`] applies
//! it to whole packets.

pub mod error;
pub mod hook;
pub mod model;
pub mod overloads;
pub mod recipient;
pub mod registry;
pub mod settings;
pub mod tree;

pub use error::OverloadError;
pub use overloads::expand_overloads;
