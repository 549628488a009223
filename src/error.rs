//! Error type shared by every GPU resource wrapper.

use std::io;
use std::path::PathBuf;

use crate::shaders::ShaderStage;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while creating or using a GPU resource.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A shader source or image file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file exists but could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An image file could not be decoded.
    #[error("failed to decode image {}", path.display())]
    DecodeFailed {
        /// Path of the image, or `<memory>` for in-memory buffers.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// A shader stage failed to compile.
    #[error("{stage} shader compilation failed: '{log}'")]
    CompileFailed {
        /// Which stage failed.
        stage: ShaderStage,
        /// Driver info log, capped at [`INFO_LOG_CAPACITY`](crate::INFO_LOG_CAPACITY) bytes.
        log: String,
    },

    /// The program failed to link.
    #[error("program linking failed: '{log}'")]
    LinkFailed {
        /// Driver info log.
        log: String,
    },

    /// The linked program did not pass validation.
    #[error("program is invalid: '{log}'")]
    ValidateFailed {
        /// Driver info log.
        log: String,
    },

    /// The driver refused to create a GL object.
    #[error("failed to create {what}: {message}")]
    Allocation {
        /// Kind of object, e.g. `"texture"`.
        what: &'static str,
        /// Message reported by the GL loader.
        message: String,
    },

    /// A mesh has more vertices than a single GL draw call can address.
    #[error("mesh has {count} vertices, more than one draw call can issue")]
    TooManyVertices {
        /// Vertex count of the rejected mesh.
        count: usize,
    },

    /// Pixel data doesn't match the image dimensions.
    #[error("{len} bytes of pixel data for a {width}x{height} RGBA8 image")]
    PixelSizeMismatch {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Length of the supplied pixel data.
        len: usize,
    },

    /// A texture unit outside `0..=31` was requested.
    #[error("texture unit {unit} out of range (max {max})", max = crate::texture::MAX_TEXTURE_UNIT)]
    InvalidTextureUnit {
        /// The rejected unit.
        unit: u32,
    },
}

impl Error {
    /// Classify an I/O failure on `path` as [`Error::NotFound`] or [`Error::Io`].
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path, source }
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(String) -> Self {
        move |message| Self::Allocation { what, message }
    }
}
