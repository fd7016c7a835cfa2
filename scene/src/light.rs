use cgmath::{InnerSpace, Point3, Vector3};

use crate::common::RgbaColor;

/// Maximum number of lights uploaded to the GPU.
pub const MAX_LIGHTS: usize = 8;

/// Discriminant read by the lighting shader.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LightType {
    Point = 0,
    Directional = 1,
    Ambient = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Uniform light reaching every surface regardless of orientation.
    Ambient { color: RgbaColor, intensity: f32 },
    /// Parallel rays travelling along `direction`.
    Directional {
        direction: Vector3<f32>,
        color: RgbaColor,
        intensity: f32,
    },
    /// Omnidirectional light without distance falloff.
    Point {
        position: Point3<f32>,
        color: RgbaColor,
        intensity: f32,
    },
}

impl Light {
    pub fn ambient(color: RgbaColor, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    /// A directional light placed at `position` and aimed at the origin.
    pub fn directional_from(position: Point3<f32>, color: RgbaColor, intensity: f32) -> Self {
        Self::Directional {
            direction: (Point3::new(0.0, 0.0, 0.0) - position).normalize(),
            color,
            intensity,
        }
    }

    pub fn point(position: Point3<f32>, color: RgbaColor, intensity: f32) -> Self {
        Self::Point {
            position,
            color,
            intensity,
        }
    }

    pub fn light_type(&self) -> LightType {
        match self {
            Light::Ambient { .. } => LightType::Ambient,
            Light::Directional { .. } => LightType::Directional,
            Light::Point { .. } => LightType::Point,
        }
    }

    /// GPU representation, with the color converted to linear light.
    pub fn to_uniform(&self) -> LightUniform {
        let (position, direction, color, intensity) = match *self {
            Light::Ambient { color, intensity } => ([0.0; 3], [0.0; 3], color, intensity),
            Light::Directional {
                direction,
                color,
                intensity,
            } => ([0.0; 3], direction.into(), color, intensity),
            Light::Point {
                position,
                color,
                intensity,
            } => (position.into(), [0.0; 3], color, intensity),
        };
        let linear = color.to_linear();
        LightUniform {
            position,
            light_type: self.light_type() as u32,
            direction,
            intensity,
            color: [linear.r, linear.g, linear.b],
            _padding: 0.0,
        }
    }
}

/// One light as laid out in the shader's uniform array (48 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub light_type: u32,
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

/// The full light block bound at group 1.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsArrayUniform {
    pub lights: [LightUniform; MAX_LIGHTS],
    pub count: u32,
    pub _padding: [u32; 3],
}

impl LightsArrayUniform {
    /// Packs up to [`MAX_LIGHTS`] lights. Extra lights are dropped with a warning.
    pub fn from_lights(lights: &[Light]) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "Scene has {} lights, only the first {MAX_LIGHTS} are used",
                lights.len()
            );
        }
        let mut block = Self {
            lights: [LightUniform::zeroed(); MAX_LIGHTS],
            count: 0,
            _padding: [0; 3],
        };
        for (slot, light) in block.lights.iter_mut().zip(lights) {
            *slot = light.to_uniform();
            block.count += 1;
        }
        block
    }
}

impl LightUniform {
    fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<LightsArrayUniform>(), 48 * MAX_LIGHTS + 16);
    }

    #[test]
    fn test_directional_from_points_at_origin() {
        let light = Light::directional_from(Point3::new(5.0, 10.0, 7.0), RgbaColor::WHITE, 1.0);
        let Light::Directional { direction, .. } = light else {
            panic!("expected directional light");
        };
        assert!((direction.magnitude() - 1.0).abs() < 1e-6);
        assert!(direction.x < 0.0 && direction.y < 0.0 && direction.z < 0.0);
    }

    #[test]
    fn test_to_uniform_fields() {
        let uniform = Light::point(Point3::new(-5.0, 5.0, -5.0), RgbaColor::WHITE, 0.5).to_uniform();
        assert_eq!(uniform.light_type, LightType::Point as u32);
        assert_eq!(uniform.position, [-5.0, 5.0, -5.0]);
        assert_eq!(uniform.intensity, 0.5);

        let ambient = Light::ambient(RgbaColor::from_hex(0x404040), 0.7).to_uniform();
        assert_eq!(ambient.light_type, LightType::Ambient as u32);
        assert!(ambient.color[0] < 0.25 / 4.0);
    }

    #[test]
    fn test_array_truncates() {
        let lights = vec![Light::ambient(RgbaColor::WHITE, 1.0); MAX_LIGHTS + 3];
        let block = LightsArrayUniform::from_lights(&lights);
        assert_eq!(block.count, MAX_LIGHTS as u32);

        let block = LightsArrayUniform::from_lights(&lights[..2]);
        assert_eq!(block.count, 2);
        assert_eq!(block.lights[2].light_type, 0);
    }
}
