use crate::config::LoaderConfig;
use crate::detect::identify::identify_file;
use crate::path::GamePath;
use crate::pipeline::PipelineBuilder;

/// What a path was identified as.
#[derive(Debug, Clone)]
pub struct FileIdentity {
    pub path: String,
    pub type_name: String,
    pub type_code: i32,
    pub message: String,
}

/// Identify `path` through the same pipeline a boot would use.
pub fn identify_path(path: String) -> FileIdentity {
    identify_path_with(path, LoaderConfig::default())
}

pub fn identify_path_with(path: String, config: LoaderConfig) -> FileIdentity {
    let builder = PipelineBuilder::with_global_registry(config);
    let path = GamePath::new(path);
    let accessor = builder.construct(&path);
    let identified = identify_file(Some(accessor.as_ref()));

    FileIdentity {
        path: path.to_string(),
        type_name: identified.file_type.name().to_string(),
        type_code: identified.file_type.code(),
        message: identified.message,
    }
}
