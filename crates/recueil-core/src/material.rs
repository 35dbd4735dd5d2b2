//! Shared handle to the background shader's parameters.
//!
//! The visual subsystem creates the material and writes into it; the store
//! only keeps a reference so other parts of the page can reach it.

use std::cell::RefCell;
use std::rc::Rc;

/// Uniform block consumed by the background shader. Layout matches WGSL.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub primary: [f32; 4],
    pub secondary: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub turbulence: f32,
    pub scroll_progress: f32,
    pub particle_kind: u32,
    pub seed: f32,
    pub intro_step: f32,
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self {
            primary: [0.0, 0.0, 0.0, 1.0],
            secondary: [0.0, 0.0, 0.0, 1.0],
            resolution: [1.0, 1.0],
            time: 0.0,
            turbulence: 0.0,
            scroll_progress: 0.0,
            particle_kind: 1,
            seed: 0.0,
            intro_step: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BackgroundMaterial {
    uniforms: MaterialUniforms,
    dirty: bool,
}

pub type MaterialHandle = Rc<RefCell<BackgroundMaterial>>;

impl BackgroundMaterial {
    pub fn new(uniforms: MaterialUniforms) -> Self {
        Self {
            uniforms,
            dirty: true,
        }
    }

    pub fn into_handle(self) -> MaterialHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn uniforms(&self) -> &MaterialUniforms {
        &self.uniforms
    }

    /// Mutate the uniforms and mark them for upload.
    pub fn update(&mut self, f: impl FnOnce(&mut MaterialUniforms)) {
        f(&mut self.uniforms);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hand out the uniforms for upload if they changed since the last call.
    pub fn take_dirty(&mut self) -> Option<MaterialUniforms> {
        if self.dirty {
            self.dirty = false;
            Some(self.uniforms)
        } else {
            None
        }
    }
}
