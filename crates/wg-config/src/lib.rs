//! WireGuard configuration file assembly and emission.

mod emitter;
mod record;

pub use emitter::{emit, EmitError};
pub use record::ConfigRecord;
