pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Input is too large ({len} bytes, limit is {limit} bytes)")]
    InputTooLarge { len: usize, limit: usize },

    #[error("Diagram has no node content")]
    EmptyDiagram,

    #[error("Invalid pipeline config: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid config JSON: {message}")]
    InvalidConfigJson { message: String },

    #[error("Invalid config YAML: {message}")]
    InvalidConfigYaml { message: String },

    #[error("Unsupported config file extension: {path}")]
    UnsupportedConfigFormat { path: String },

    #[error("Failed to read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown detail level: {value} (expected simple, detailed or advanced)")]
    UnknownDetailLevel { value: String },
}
