//! Lighting presets
//!
//! Phong material presets (the classic table of measured real-world
//! materials) and the point-light attenuation table indexed by the distance
//! a light should cover.

use crate::foundation::math::Vec3;
use crate::render::shader::ShaderProgram;

/// Phong material coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient reflectance
    pub ambient: Vec3,
    /// Diffuse reflectance
    pub diffuse: Vec3,
    /// Specular reflectance
    pub specular: Vec3,
    /// Shininess as a fraction of 128
    pub shininess: f32,
}

impl Material {
    const fn new(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3], shininess: f32) -> Self {
        Self {
            ambient: Vec3::new(ambient[0], ambient[1], ambient[2]),
            diffuse: Vec3::new(diffuse[0], diffuse[1], diffuse[2]),
            specular: Vec3::new(specular[0], specular[1], specular[2]),
            shininess,
        }
    }

    /// Specular exponent for the shader
    pub fn shininess_exponent(&self) -> f32 {
        self.shininess * 128.0
    }

    /// Set `<prefix>.ambient`, `.diffuse`, `.specular` and `.shininess`
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and `shader` bound.
    pub unsafe fn upload(&self, gl: &glow::Context, shader: &ShaderProgram, prefix: &str) {
        unsafe {
            shader.set_vec3(gl, &format!("{prefix}.ambient"), &self.ambient);
            shader.set_vec3(gl, &format!("{prefix}.diffuse"), &self.diffuse);
            shader.set_vec3(gl, &format!("{prefix}.specular"), &self.specular);
            shader.set_float(gl, &format!("{prefix}.shininess"), self.shininess_exponent());
        }
    }
}

/// Named material presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MaterialPreset {
    Emerald,
    Jade,
    Obsidian,
    Pearl,
    Ruby,
    Turquoise,
    Brass,
    Bronze,
    Chrome,
    Copper,
    Gold,
    Silver,
    BlackPlastic,
    CyanPlastic,
    GreenPlastic,
    RedPlastic,
    WhitePlastic,
    YellowPlastic,
    BlackRubber,
    CyanRubber,
    GreenRubber,
    RedRubber,
    WhiteRubber,
    YellowRubber,
}

impl MaterialPreset {
    /// Every preset in table order
    pub const ALL: [Self; 24] = [
        Self::Emerald,
        Self::Jade,
        Self::Obsidian,
        Self::Pearl,
        Self::Ruby,
        Self::Turquoise,
        Self::Brass,
        Self::Bronze,
        Self::Chrome,
        Self::Copper,
        Self::Gold,
        Self::Silver,
        Self::BlackPlastic,
        Self::CyanPlastic,
        Self::GreenPlastic,
        Self::RedPlastic,
        Self::WhitePlastic,
        Self::YellowPlastic,
        Self::BlackRubber,
        Self::CyanRubber,
        Self::GreenRubber,
        Self::RedRubber,
        Self::WhiteRubber,
        Self::YellowRubber,
    ];

    /// Coefficients of the preset
    pub fn material(self) -> Material {
        MATERIALS[self as usize]
    }
}

#[rustfmt::skip]
const MATERIALS: [Material; 24] = [
    Material::new([0.0215, 0.1745, 0.0215],     [0.07568, 0.61424, 0.07568],      [0.633, 0.727811, 0.633],            0.6),
    Material::new([0.135, 0.2225, 0.1575],      [0.54, 0.89, 0.63],               [0.316228, 0.316228, 0.316228],      0.1),
    Material::new([0.05375, 0.05, 0.06625],     [0.18275, 0.17, 0.22525],         [0.332741, 0.328634, 0.346435],      0.3),
    Material::new([0.25, 0.20725, 0.20725],     [1.0, 0.829, 0.829],              [0.296648, 0.296648, 0.296648],      0.088),
    Material::new([0.1745, 0.01175, 0.01175],   [0.61424, 0.04136, 0.04136],      [0.727811, 0.626959, 0.626959],      0.6),
    Material::new([0.1, 0.18725, 0.1745],       [0.396, 0.74151, 0.69102],        [0.297254, 0.30829, 0.306678],       0.1),
    Material::new([0.329412, 0.223529, 0.027451], [0.780392, 0.568627, 0.113725], [0.992157, 0.941176, 0.807843],      0.217_948_72),
    Material::new([0.2125, 0.1275, 0.054],      [0.714, 0.4284, 0.18144],         [0.393548, 0.271906, 0.166721],      0.2),
    Material::new([0.25, 0.25, 0.25],           [0.4, 0.4, 0.4],                  [0.774597, 0.774597, 0.774597],      0.6),
    Material::new([0.19125, 0.0735, 0.0225],    [0.7038, 0.27048, 0.0828],        [0.256777, 0.137622, 0.086014],      0.1),
    Material::new([0.24725, 0.1995, 0.0745],    [0.75164, 0.60648, 0.22648],      [0.628281, 0.555802, 0.366065],      0.4),
    Material::new([0.19225, 0.19225, 0.19225],  [0.50754, 0.50754, 0.50754],      [0.508273, 0.508273, 0.508273],      0.4),
    Material::new([0.0, 0.0, 0.0],              [0.01, 0.01, 0.01],               [0.50, 0.50, 0.50],                  0.25),
    Material::new([0.0, 0.1, 0.06],             [0.0, 0.509_803_9, 0.509_803_9],  [0.501_960_8, 0.501_960_8, 0.501_960_8], 0.25),
    Material::new([0.0, 0.0, 0.0],              [0.1, 0.35, 0.1],                 [0.45, 0.55, 0.45],                  0.25),
    Material::new([0.0, 0.0, 0.0],              [0.5, 0.0, 0.0],                  [0.7, 0.6, 0.6],                     0.25),
    Material::new([0.0, 0.0, 0.0],              [0.55, 0.55, 0.55],               [0.70, 0.70, 0.70],                  0.25),
    Material::new([0.0, 0.0, 0.0],              [0.5, 0.5, 0.0],                  [0.60, 0.60, 0.50],                  0.25),
    Material::new([0.02, 0.02, 0.02],           [0.01, 0.01, 0.01],               [0.4, 0.4, 0.4],                     0.078125),
    Material::new([0.0, 0.05, 0.05],            [0.4, 0.5, 0.5],                  [0.04, 0.7, 0.7],                    0.078125),
    Material::new([0.0, 0.05, 0.0],             [0.4, 0.5, 0.4],                  [0.04, 0.7, 0.04],                   0.078125),
    Material::new([0.05, 0.0, 0.0],             [0.5, 0.4, 0.4],                  [0.7, 0.04, 0.04],                   0.078125),
    Material::new([0.05, 0.05, 0.05],           [0.5, 0.5, 0.5],                  [0.7, 0.7, 0.7],                     0.078125),
    Material::new([0.05, 0.05, 0.0],            [0.5, 0.5, 0.4],                  [0.7, 0.7, 0.04],                    0.078125),
];

/// Point-light falloff `1 / (constant + linear·d + quadratic·d²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Distance the coefficients are tuned to cover
    pub distance: f32,
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Attenuation {
    const fn new(distance: f32, linear: f32, quadratic: f32) -> Self {
        Self { distance, constant: 1.0, linear, quadratic }
    }

    /// Light fraction remaining at distance `d`
    pub fn factor(&self, d: f32) -> f32 {
        1.0 / (self.constant + self.linear * d + self.quadratic * d * d)
    }
}

/// Attenuation coefficients by covered distance, ascending
pub const ATTENUATION_TABLE: [Attenuation; 12] = [
    Attenuation::new(7.0, 0.7, 1.8),
    Attenuation::new(13.0, 0.35, 0.44),
    Attenuation::new(20.0, 0.22, 0.20),
    Attenuation::new(32.0, 0.14, 0.07),
    Attenuation::new(50.0, 0.09, 0.032),
    Attenuation::new(65.0, 0.07, 0.017),
    Attenuation::new(100.0, 0.045, 0.0075),
    Attenuation::new(160.0, 0.027, 0.0028),
    Attenuation::new(200.0, 0.022, 0.0019),
    Attenuation::new(325.0, 0.014, 0.0007),
    Attenuation::new(600.0, 0.007, 0.0002),
    Attenuation::new(3250.0, 0.0014, 0.000_007),
];

/// Smallest table entry covering `distance`; the largest entry beyond it
pub fn attenuation_for_distance(distance: f32) -> Attenuation {
    ATTENUATION_TABLE
        .iter()
        .copied()
        .find(|entry| entry.distance >= distance)
        .unwrap_or(ATTENUATION_TABLE[ATTENUATION_TABLE.len() - 1])
}

/// Point light
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Ambient intensity
    pub ambient: Vec3,
    /// Diffuse intensity
    pub diffuse: Vec3,
    /// Specular intensity
    pub specular: Vec3,
    /// Falloff
    pub attenuation: Attenuation,
}

impl PointLight {
    /// White light at `position` reaching `range` units
    pub fn white(position: Vec3, range: f32) -> Self {
        Self {
            position,
            ambient: Vec3::new(0.1, 0.1, 0.1),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::new(1.0, 1.0, 1.0),
            attenuation: attenuation_for_distance(range),
        }
    }

    /// Set the `<prefix>.*` uniforms
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and `shader` bound.
    pub unsafe fn upload(&self, gl: &glow::Context, shader: &ShaderProgram, prefix: &str) {
        unsafe {
            shader.set_vec3(gl, &format!("{prefix}.position"), &self.position);
            shader.set_vec3(gl, &format!("{prefix}.ambient"), &self.ambient);
            shader.set_vec3(gl, &format!("{prefix}.diffuse"), &self.diffuse);
            shader.set_vec3(gl, &format!("{prefix}.specular"), &self.specular);
            shader.set_float(gl, &format!("{prefix}.constant"), self.attenuation.constant);
            shader.set_float(gl, &format!("{prefix}.linear"), self.attenuation.linear);
            shader.set_float(gl, &format!("{prefix}.quadratic"), self.attenuation.quadratic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets_follow_table_order() {
        for (index, preset) in MaterialPreset::ALL.iter().enumerate() {
            assert_eq!(*preset as usize, index);
        }
        assert_eq!(MaterialPreset::Emerald.material().shininess, 0.6);
        assert_eq!(MaterialPreset::YellowRubber.material().specular, Vec3::new(0.7, 0.7, 0.04));
        assert_relative_eq!(MaterialPreset::Gold.material().shininess_exponent(), 51.2, epsilon = 1e-4);
    }

    #[test]
    fn test_attenuation_lookup() {
        assert_eq!(attenuation_for_distance(0.0).distance, 7.0);
        assert_eq!(attenuation_for_distance(7.0).distance, 7.0);
        assert_eq!(attenuation_for_distance(7.5).distance, 13.0);
        assert_eq!(attenuation_for_distance(150.0).distance, 160.0);
        assert_eq!(attenuation_for_distance(10_000.0).distance, 3250.0);
    }

    #[test]
    fn test_attenuation_table_is_ascending() {
        for pair in ATTENUATION_TABLE.windows(2) {
            assert!(pair[0].distance < pair[1].distance);
            assert!(pair[0].linear > pair[1].linear);
        }
        assert_eq!(ATTENUATION_TABLE[0].factor(0.0), 1.0);
    }
}
