//! Proxy geometry for the volume: a box in 3D and a quad in 2D.
//!
//! Both are centered at the origin and scaled so the longest image axis
//! spans `[-1, 1]`. x follows image width, y height and z depth.

use glam::{Vec2, Vec3};
use slabview_core::{Image, ViewMode};

/// Vertices in the 3D box (12 triangles).
pub const CUBE_VERTEX_COUNT: u32 = 36;

/// Vertices in the 2D quad (2 triangles).
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Half extents of the volume box in world units.
#[must_use]
pub fn half_extent(image: &Image) -> Vec3 {
    let [depth, height, width] = image.normalized_extent();
    Vec3::new(width, height, depth)
}

/// Generates the 36-vertex box as flat `xyz` triples.
#[must_use]
pub fn generate_cube(half: Vec3) -> Vec<f32> {
    // +x, -x, +y, -y, +z, -z; corners run counter-clockwise seen from outside
    const FACES: [[[f32; 3]; 4]; 6] = [
        [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        [[-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0]],
        [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0]],
        [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    ];

    let mut vertices = Vec::with_capacity(CUBE_VERTEX_COUNT as usize * 3);
    for face in &FACES {
        for corner in [0, 1, 2, 0, 2, 3] {
            let p = Vec3::from_array(face[corner]) * half;
            vertices.extend_from_slice(&p.to_array());
        }
    }
    vertices
}

/// Generates the 6-vertex quad as flat `xy` pairs.
#[must_use]
pub fn generate_quad(half: Vec2) -> Vec<f32> {
    const CORNERS: [[f32; 2]; 6] = [
        [-1.0, -1.0],
        [1.0, -1.0],
        [1.0, 1.0],
        [-1.0, -1.0],
        [1.0, 1.0],
        [-1.0, 1.0],
    ];

    CORNERS
        .iter()
        .flat_map(|&corner| (Vec2::from_array(corner) * half).to_array())
        .collect()
}

/// Proxy geometry for one view mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<f32>,
    pub vertex_count: u32,
    /// Floats per vertex.
    pub components: u32,
}

impl Geometry {
    #[must_use]
    pub fn for_image(mode: ViewMode, image: &Image) -> Self {
        let half = half_extent(image);
        match mode {
            ViewMode::Volume => Self {
                vertices: generate_cube(half),
                vertex_count: CUBE_VERTEX_COUNT,
                components: 3,
            },
            ViewMode::Slice => Self {
                vertices: generate_quad(half.truncate()),
                vertex_count: QUAD_VERTEX_COUNT,
                components: 2,
            },
        }
    }

    /// Byte stride of one vertex.
    #[must_use]
    pub fn stride(&self) -> wgpu::BufferAddress {
        wgpu::BufferAddress::from(self.components) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image(size: [u32; 3]) -> Image {
        let len = size.iter().map(|&s| s as usize).product();
        Image::new(vec![0; len], size).unwrap()
    }

    #[test]
    fn test_cube_counts() {
        let geometry = Geometry::for_image(ViewMode::Volume, &image([4, 4, 4]));
        assert_eq!(geometry.vertices.len(), 36 * 3);
        assert_eq!(geometry.vertex_count, 36);
        assert_eq!(geometry.stride(), 12);
    }

    #[test]
    fn test_quad_counts() {
        let geometry = Geometry::for_image(ViewMode::Slice, &image([4, 4, 4]));
        assert_eq!(geometry.vertices.len(), 6 * 2);
        assert_eq!(geometry.vertex_count, 6);
        assert_eq!(geometry.stride(), 8);
    }

    #[test]
    fn test_cube_follows_aspect() {
        // depth 2, height 4, width 8
        let cube = generate_cube(half_extent(&image([2, 4, 8])));
        let max_abs = |axis: usize| {
            cube.chunks_exact(3)
                .map(|v| v[axis].abs())
                .fold(0.0_f32, f32::max)
        };
        assert_eq!(max_abs(0), 1.0);
        assert_eq!(max_abs(1), 0.5);
        assert_eq!(max_abs(2), 0.25);
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let cube = generate_cube(Vec3::ONE);
        for tri in cube.chunks_exact(9) {
            let a = Vec3::new(tri[0], tri[1], tri[2]);
            let b = Vec3::new(tri[3], tri[4], tri[5]);
            let c = Vec3::new(tri[6], tri[7], tri[8]);
            let normal = (b - a).cross(c - a);
            let center = (a + b + c) / 3.0;
            assert!(normal.dot(center) > 0.0, "triangle {a} {b} {c} faces inward");
        }
    }

    #[test]
    fn test_quad_follows_aspect() {
        let quad = generate_quad(half_extent(&image([3, 2, 4])).truncate());
        assert!(quad.chunks_exact(2).all(|v| v[0].abs() == 1.0 && v[1].abs() == 0.5));
    }

    proptest! {
        #[test]
        fn prop_cube_touches_each_face_of_the_extent(
            depth in 1u32..64,
            height in 1u32..64,
            width in 1u32..64,
        ) {
            let half = half_extent(&image([depth, height, width]));
            let cube = generate_cube(half);
            for (axis, limit) in half.to_array().into_iter().enumerate() {
                let coords: Vec<f32> = cube.chunks_exact(3).map(|v| v[axis]).collect();
                prop_assert!(coords.iter().all(|c| c.abs() <= limit));
                prop_assert!(coords.iter().any(|&c| c == limit));
                prop_assert!(coords.iter().any(|&c| c == -limit));
            }
            prop_assert_eq!(half.max_element(), 1.0);
        }

        #[test]
        fn prop_quad_stays_within_extent(
            depth in 1u32..64,
            height in 1u32..64,
            width in 1u32..64,
        ) {
            let half = half_extent(&image([depth, height, width])).truncate();
            let quad = generate_quad(half);
            prop_assert!(quad
                .chunks_exact(2)
                .all(|v| v[0].abs() == half.x && v[1].abs() == half.y));
        }
    }
}
