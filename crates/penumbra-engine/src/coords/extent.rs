/// Size of a render surface or offscreen target in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Integer half of each axis (`floor(w / 2) x floor(h / 2)`).
    #[inline]
    pub const fn halved(self) -> Self {
        Self {
            width: self.width / 2,
            height: self.height / 2,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; `1.0` for degenerate extents.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Extent {
    #[inline]
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halved_floors_odd_axes() {
        assert_eq!(Extent::new(721, 487).halved(), Extent::new(360, 243));
    }

    #[test]
    fn halved_of_one_is_empty() {
        assert!(Extent::new(1, 9).halved().is_empty());
    }

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(Extent::new(10, 0).aspect(), 1.0);
        assert_eq!(Extent::new(720, 360).aspect(), 2.0);
    }
}
