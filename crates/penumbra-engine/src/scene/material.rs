use crate::paint::Color;

/// Phong surface terms. `shininess` of zero disables the highlight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Material {
    /// Matte surface: diffuse colour with a uniform ambient term and no highlight.
    pub fn matte(diffuse: Color, ambient: f32) -> Self {
        Self {
            ambient: Color::grey(ambient),
            diffuse,
            specular: Color::BLACK,
            shininess: 0.0,
        }
    }

    pub fn with_specular(mut self, specular: Color, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::matte(Color::WHITE, 0.3)
    }
}
