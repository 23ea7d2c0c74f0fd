//! Common re-exports pulled in with `use crt_core::prelude::*;`, mirroring
//! `agent_core::prelude` from `agentgateway`.

pub use std::sync::Arc;

pub use tracing::{Instrument, debug, error, info, instrument, trace, warn};

pub use crate::error::{ArgumentError, CodecError, CrtError, ServiceError, TransportError};
