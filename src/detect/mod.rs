// Detection: identifying artifacts and reading the container metadata that identification needs.

pub mod identify;
pub mod pbp;
pub mod sfo;

pub use identify::{identify_file, IdentifiedFileType, Identification};
