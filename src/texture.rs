//! Image decoding and 2D texture objects.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::ImageError;

use crate::backend::Backend;
use crate::context::{gl_size, Context, TextureUnits};
use crate::error::{Error, Result};

/// Highest texture unit [`Texture::bind`] accepts.
pub const MAX_TEXTURE_UNIT: u32 = 31;

/// A decoded image, always RGBA8 regardless of the source's channel count.
///
/// Holds exactly `width * height * 4` bytes of pixel data.
#[derive(Clone)]
pub struct TextureImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl TextureImage {
    /// Wrap row-major RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// [`Error::PixelSizeMismatch`] unless `pixels` is exactly
    /// `width * height * 4` bytes long.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(pixels.len()) {
            return Err(Error::PixelSizeMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    fn from_rgba(rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self {
            pixels: rgba.into_raw(),
            width,
            height,
        }
    }

    /// Decode the image file at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the file doesn't exist, [`Error::Io`] if it
    /// can't be read, [`Error::DecodeFailed`] if it isn't a supported image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| match source {
            ImageError::IoError(io) => Error::from_io(path, io),
            source => Error::DecodeFailed {
                path: path.to_owned(),
                source,
            },
        })?;
        let decoded = Self::from_rgba(image.to_rgba8());
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            decoded.width,
            decoded.height
        );
        Ok(decoded)
    }

    /// Decode an encoded image held in memory.
    ///
    /// # Errors
    ///
    /// [`Error::DecodeFailed`] if the bytes aren't a supported image.
    pub fn from_memory(data: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(data)
            .map_err(|source| Error::DecodeFailed {
                path: PathBuf::from("<memory>"),
                source,
            })?
            .to_rgba8();
        Ok(Self::from_rgba(rgba))
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 pixels.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// A 2D texture object with repeat wrapping and linear filtering.
///
/// Dropping it deletes the texture.
pub struct Texture<B: Backend> {
    backend: Rc<B>,
    units: Rc<RefCell<TextureUnits<B::Texture>>>,
    texture: B::Texture,
    width: u32,
    height: u32,
}

impl<B: Backend> Texture<B> {
    /// Decode `path` and upload it. The decoded pixels are released once the
    /// upload is issued.
    ///
    /// # Errors
    ///
    /// Any error from [`TextureImage::open`], in which case no GL object is
    /// created, or [`Error::Allocation`].
    pub fn from_path(ctx: &mut Context<B>, path: impl AsRef<Path>) -> Result<Self> {
        let image = TextureImage::open(path)?;
        Self::new(ctx, &image)
    }

    /// Upload decoded pixels as a new texture.
    ///
    /// The upload goes through the active texture unit, which holds the same
    /// texture afterwards as it did before.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the driver refuses a texture object.
    pub fn new(ctx: &mut Context<B>, image: &TextureImage) -> Result<Self> {
        let backend = ctx.share_backend();
        let texture = backend
            .create_texture()
            .map_err(Error::allocation("texture"))?;
        let previous = ctx.active_texture_binding();

        let gl = &*backend;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        set_default_tex_params(gl);
        gl.tex_image_2d_rgba8(
            glow::TEXTURE_2D,
            gl_size(image.width),
            gl_size(image.height),
            &image.pixels,
        );
        gl.bind_texture(glow::TEXTURE_2D, previous);

        log::debug!(
            "Uploaded texture {texture:?} ({}x{})",
            image.width,
            image.height
        );
        Ok(Self {
            backend,
            units: ctx.share_texture_units(),
            texture,
            width: image.width,
            height: image.height,
        })
    }

    /// Size in pixels.
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// Make this the 2D texture of texture unit `unit`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTextureUnit`] if `unit` is above
    /// [`MAX_TEXTURE_UNIT`]; nothing is bound in that case.
    pub fn bind(&self, ctx: &mut Context<B>, unit: u32) -> Result<()> {
        if unit > MAX_TEXTURE_UNIT {
            return Err(Error::InvalidTextureUnit { unit });
        }
        ctx.bind_texture(unit, self.texture);
        Ok(())
    }
}

impl<B: Backend> fmt::Debug for Texture<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("texture", &self.texture)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Drop for Texture<B> {
    fn drop(&mut self) {
        self.backend.delete_texture(self.texture);
        self.units.borrow_mut().forget(self.texture);
        log::debug!("Deleted texture {:?}", self.texture);
    }
}

/// Repeat wrapping on both axes, linear min/mag filtering.
fn set_default_tex_params<B: Backend>(gl: &B) {
    // GL constant values are small enough that the cast is always safe.
    #[expect(clippy::cast_possible_wrap)]
    {
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
    }
}
