//! Boot-time file loading for a PSP emulation host.
//!
//! Given a path, the crate builds a decorated accessor pipeline for it,
//! identifies what kind of artifact it is from magic bytes and path hints,
//! and routes it to the matching loading routine of the host. It also
//! implements hot-swapping of the mounted disc.

pub mod api;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod path;
pub mod pipeline;
pub mod registry;
pub mod source;

pub use config::LoaderConfig;
pub use detect::identify::{identify_file, IdentifiedFileType, Identification};
pub use engine::host::Host;
pub use engine::session::{CoreState, Session};
pub use error::{LoadError, ReplaceError};
pub use path::{GamePath, PathKind};
pub use pipeline::PipelineBuilder;
pub use registry::{FactoryRegistry, LoaderFactory};
pub use source::traits::FileAccessor;
