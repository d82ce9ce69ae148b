//! # Primitive Shape Generation
//!
//! All shapes are generated with normals and texture coordinates.

use super::GeometryData;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has outward normals and UV coordinates from 0 to 1.
pub fn generate_cube() -> GeometryData {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, u axis, v axis
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut data = GeometryData::new();
    for (normal, u, v) in FACES {
        let base = data.positions.len() as u32;
        for (cu, cv) in CORNERS {
            data.positions.push([
                normal[0] * 0.5 + u[0] * cu + v[0] * cv,
                normal[1] * 0.5 + u[1] * cu + v[1] * cv,
                normal[2] * 0.5 + u[2] * cu + v[2] * cv,
            ]);
            data.normals.push(normal);
            data.tex_coords.push([cu + 0.5, cv + 0.5]);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a flat square grid on the XZ plane, centered at the origin
///
/// Vertices are laid out x-major: vertex `(x, z)` has index
/// `x * (resolution + 1) + z`. Every quad is split into two triangles wound
/// counter-clockwise when seen from +Y, normals point up and texture
/// coordinates span `[0, 1]` across the grid.
///
/// # Arguments
/// * `resolution` - Number of quads along each side, must be positive
/// * `length` - Side length of the grid in world units
///
/// # Returns
/// `(resolution + 1)^2` vertices and `resolution^2 * 6` indices
pub fn generate_grid(resolution: u32, length: f32) -> GeometryData {
    assert!(resolution > 0, "grid resolution must be positive");

    let side = resolution as usize + 1;
    let half_len = length * 0.5;
    let step = length / resolution as f32;

    let mut data = GeometryData {
        positions: Vec::with_capacity(side * side),
        tex_coords: Vec::with_capacity(side * side),
        normals: vec![[0.0, 1.0, 0.0]; side * side],
        indices: Vec::with_capacity(resolution as usize * resolution as usize * 6),
    };

    for x in 0..=resolution {
        for z in 0..=resolution {
            data.positions
                .push([x as f32 * step - half_len, 0.0, z as f32 * step - half_len]);
            data.tex_coords
                .push([x as f32 / resolution as f32, z as f32 / resolution as f32]);
        }
    }

    let row = resolution + 1;
    for x in 0..resolution {
        for z in 0..resolution {
            let vi = x * row + z;
            data.indices.extend_from_slice(&[
                vi,
                vi + 1,
                vi + row,
                vi + row,
                vi + 1,
                vi + row + 1,
            ]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal_y(data: &GeometryData, tri: &[u32]) -> f32 {
        let a = data.positions[tri[0] as usize];
        let b = data.positions[tri[1] as usize];
        let c = data.positions[tri[2] as usize];
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        e1[2] * e2[0] - e1[0] * e2[2]
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.tex_coords.len(), 24);
        for p in &cube.positions {
            assert!(p.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
        }
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let cube = generate_cube();
        for tri in cube.indices.chunks(3) {
            let a = cube.positions[tri[0] as usize];
            let b = cube.positions[tri[1] as usize];
            let c = cube.positions[tri[2] as usize];
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let face = cube.normals[tri[0] as usize];
            let dot = n[0] * face[0] + n[1] * face[1] + n[2] * face[2];
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn test_grid_counts() {
        for res in [1u32, 4, 17] {
            let grid = generate_grid(res, 10.0);
            let side = (res + 1) as usize;
            assert_eq!(grid.vertex_count(), side * side);
            assert_eq!(grid.normals.len(), side * side);
            assert_eq!(grid.tex_coords.len(), side * side);
            assert_eq!(grid.indices.len(), (res * res * 6) as usize);
        }
    }

    #[test]
    fn test_grid_extents() {
        let grid = generate_grid(8, 50.0);
        let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
        let (mut min_z, mut max_z) = (f32::MAX, f32::MIN);
        for p in &grid.positions {
            assert_eq!(p[1], 0.0);
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_z = min_z.min(p[2]);
            max_z = max_z.max(p[2]);
        }
        assert_eq!((min_x, max_x), (-25.0, 25.0));
        assert_eq!((min_z, max_z), (-25.0, 25.0));
    }

    #[test]
    fn test_grid_winding_is_counter_clockwise_from_above() {
        let grid = generate_grid(6, 3.0);
        for tri in grid.indices.chunks(3) {
            assert!(triangle_normal_y(&grid, tri) > 0.0, "triangle {:?}", tri);
        }
    }

    #[test]
    fn test_grid_layout_is_x_major() {
        let grid = generate_grid(4, 4.0);
        assert_eq!(grid.positions[0], [-2.0, 0.0, -2.0]);
        assert_eq!(grid.positions[1], [-2.0, 0.0, -1.0]);
        assert_eq!(grid.positions[5], [-1.0, 0.0, -2.0]);
        assert_eq!(grid.tex_coords[24], [1.0, 1.0]);
        assert!(grid.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    #[should_panic]
    fn test_grid_rejects_zero_resolution() {
        generate_grid(0, 1.0);
    }
}
