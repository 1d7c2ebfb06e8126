use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Utf8 { path: String },

    #[error("image decode/encode failed")]
    Image(#[from] image::ImageError),

    #[error("{tool} not found on PATH")]
    ToolMissing { tool: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("opening docx container")]
    Zip(#[from] zip::result::ZipError),

    #[error("parsing docx xml: {0}")]
    Xml(String),
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
