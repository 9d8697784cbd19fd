//! LogoForge: generative branding agents.
//!
//! - [`contract`]: capability requests, shape contracts, decoded results
//! - [`audio`]: base64 PCM16 speech payloads to float sample buffers
//! - [`stream`]: the live gallery, fed by a timer and annotated by the backend
//! - [`router`]: single-flight dispatch of lab agents
//!
//! Everything talks to the model through [`backend::GenerativeBackend`].

pub mod audio;
pub mod backend;
pub mod contract;
pub mod router;
pub mod stream;
pub mod telemetry;

pub use backend::{BackendError, GenerativeBackend};
pub use contract::{CapabilityRequest, CapabilityResult, ContractLayer};
pub use router::Router;
pub use stream::LiveStream;
