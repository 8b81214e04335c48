// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed primitive meshes: boxes and cylinders

use nalgebra::{Point3, Vector3};

use crate::bounds::Box3;
use crate::error::Result;
use crate::extrusion::extrude_profile;
use crate::mesh::Mesh;
use crate::profile::create_circle;

/// World axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Axis> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn unit(self) -> Vector3<f64> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

/// Corner order of a hexahedron: bottom ring then top ring, each
/// counter-clockwise seen from above. Matches [`Box3::corners`].
const HEX_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// Six-faced solid with flat-shaded faces and outward normals
pub fn hexahedron(corners: &[Point3<f64>; 8]) -> Mesh {
    let mut mesh = Mesh::with_capacity(24, 36);

    for face in HEX_FACES {
        let [a, b, c, d] = face.map(|i| corners[i]);
        let normal = match (b - a).cross(&(c - a)).try_normalize(1e-12) {
            Some(n) => n,
            None => continue,
        };

        let base = mesh.vertex_count() as u32;
        for p in [a, b, c, d] {
            mesh.add_vertex(p, normal);
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }

    mesh
}

/// Axis-aligned box centred on the origin
pub fn box_mesh(extents: Vector3<f64>) -> Mesh {
    hexahedron(&Box3::from_center_extents(Point3::origin(), extents).corners())
}

/// Box spanned by three orthogonal half-axes around `center`
pub fn oriented_box(center: Point3<f64>, half_axes: [Vector3<f64>; 3]) -> Mesh {
    let [a, b, mut c] = half_axes;
    if a.cross(&b).dot(&c) < 0.0 {
        c = -c;
    }
    let corners = [
        center - a - b - c,
        center + a - b - c,
        center + a + b - c,
        center - a + b - c,
        center - a - b + c,
        center + a - b + c,
        center + a + b + c,
        center - a + b + c,
    ];
    hexahedron(&corners)
}

/// Cylinder centred on the origin, its axis along `axis`
pub fn cylinder_mesh(radius: f64, length: f64, axis: Axis) -> Result<Mesh> {
    let mut mesh = extrude_profile(&create_circle(radius), length)?;
    mesh.translate(Vector3::new(0.0, 0.0, -length / 2.0));

    // Cyclic permutation keeps the winding
    let permute = |chunk: &mut [f32]| {
        let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
        match axis {
            Axis::Z => {}
            Axis::X => {
                chunk[0] = z;
                chunk[1] = x;
                chunk[2] = y;
            }
            Axis::Y => {
                chunk[0] = y;
                chunk[1] = z;
                chunk[2] = x;
            }
        }
    };
    mesh.positions.chunks_exact_mut(3).for_each(permute);
    mesh.normals.chunks_exact_mut(3).for_each(permute);

    Ok(mesh)
}
