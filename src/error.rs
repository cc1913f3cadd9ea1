use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlideError>;

/// Everything that can stop a slide from being produced. Any of these is
/// terminal for the render call; no partial slide is returned.
#[derive(Debug, Error)]
pub enum SlideError {
    /// Canvas margins or dimensions leave no usable content area.
    #[error("invalid canvas config: {0}")]
    InvalidCanvasConfig(String),

    /// A row of boxes (or the legend) does not fit the width it was given.
    #[error("layout overflow: {0}")]
    LayoutOverflow(String),

    /// The tree data refers to levels or boxes that do not exist.
    #[error("invalid slide content: {0}")]
    InvalidContent(String),

    /// The renderer backend failed while building or serializing the document.
    #[error("render failure: {0}")]
    RenderFailure(String),
}

impl From<zip::result::ZipError> for SlideError {
    fn from(err: zip::result::ZipError) -> Self {
        SlideError::RenderFailure(err.to_string())
    }
}

impl From<std::io::Error> for SlideError {
    fn from(err: std::io::Error) -> Self {
        SlideError::RenderFailure(err.to_string())
    }
}

impl From<std::fmt::Error> for SlideError {
    fn from(err: std::fmt::Error) -> Self {
        SlideError::RenderFailure(err.to_string())
    }
}
