// Engine orchestration: session lifecycle, boot dispatch and disc swapping.

pub mod dispatch;
pub mod host;
pub mod replace;
pub mod session;

pub use host::Host;
pub use session::{CoreState, Session};
