//! Explicit owner of the GL context's implicit binding state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::Backend;
use crate::texture::MAX_TEXTURE_UNIT;

const TEXTURE_UNITS: usize = MAX_TEXTURE_UNIT as usize + 1;

/// Which 2D texture each unit holds, as bound through a [`Context`].
#[derive(Debug)]
pub(crate) struct TextureUnits<T> {
    active: u32,
    bound: [Option<T>; TEXTURE_UNITS],
}

impl<T: Copy + PartialEq> TextureUnits<T> {
    fn new() -> Self {
        Self {
            active: 0,
            bound: [None; TEXTURE_UNITS],
        }
    }

    /// Texture on the active unit.
    fn active_binding(&self) -> Option<T> {
        self.bound[self.active as usize]
    }

    /// Clear every unit holding `texture`. GL does the same when a bound
    /// texture is deleted.
    pub(crate) fn forget(&mut self, texture: T) {
        for slot in &mut self.bound {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }
}

/// Handle to a graphics context.
///
/// Resources keep their own reference to the backend so they can release
/// their handles on drop. Every operation that changes what is currently
/// bound (program, texture unit, vertex array) or draws takes
/// `&mut Context`, resource creation included, so binding and drawing are
/// ordered by the borrow checker rather than by convention.
#[derive(Debug)]
pub struct Context<B: Backend> {
    backend: Rc<B>,
    texture_units: Rc<RefCell<TextureUnits<B::Texture>>>,
}

impl<B: Backend> Context<B> {
    /// Take ownership of a backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Rc::new(backend),
            texture_units: Rc::new(RefCell::new(TextureUnits::new())),
        }
    }

    /// The backend, for issuing calls.
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// A new reference to the backend, for resources that release handles on
    /// drop.
    pub(crate) fn share_backend(&self) -> Rc<B> {
        Rc::clone(&self.backend)
    }

    /// The texture unit record, for textures that must leave it on drop.
    pub(crate) fn share_texture_units(&self) -> Rc<RefCell<TextureUnits<B::Texture>>> {
        Rc::clone(&self.texture_units)
    }

    /// Texture bound to `TEXTURE_2D` on the active unit.
    pub(crate) fn active_texture_binding(&self) -> Option<B::Texture> {
        self.texture_units.borrow().active_binding()
    }

    /// Make `unit` active and bind `texture` to its `TEXTURE_2D` target.
    /// `unit` must not exceed [`MAX_TEXTURE_UNIT`].
    pub(crate) fn bind_texture(&mut self, unit: u32, texture: B::Texture) {
        self.backend.active_texture(glow::TEXTURE0 + unit);
        self.backend.bind_texture(glow::TEXTURE_2D, Some(texture));

        let mut units = self.texture_units.borrow_mut();
        units.active = unit;
        units.bound[unit as usize] = Some(texture);
    }

    /// Set the viewport to cover `width` x `height` pixels from the origin.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.backend.viewport(0, 0, gl_size(width), gl_size(height));
    }

    /// Clear the color buffer to `color` (RGBA).
    pub fn clear(&mut self, [red, green, blue, alpha]: [f32; 4]) {
        self.backend.clear_color(red, green, blue, alpha);
        self.backend.clear(glow::COLOR_BUFFER_BIT);
    }
}

/// Convert a `u32` to `i32` for GL API calls, saturating at `i32::MAX`.
pub(crate) fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
