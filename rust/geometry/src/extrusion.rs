// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D profiles to 3D meshes

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Point2, Point3, Vector3};
use panelview_core::ExtrusionProfile;

/// Swept profile solid, centred on its own bounds
#[derive(Debug, Clone)]
pub struct ExtrusionGeometry {
    pub mesh: Mesh,
    /// World-space centre
    pub center: Point3<f64>,
}

/// Sweep an extrusion record's contour along +Z by its thickness.
///
/// Contour coordinates are relative to `position`; the returned mesh is
/// re-centred and `center` carries the world placement.
pub fn build_extrusion(record: &ExtrusionProfile) -> Result<ExtrusionGeometry> {
    if !record.position.is_finite() {
        return Err(Error::UnresolvableRecord {
            entity: format!("extrusion {}", record.id),
            reason: "non-finite position".to_string(),
        });
    }

    let profile = Profile2D::from_contour(record.contour.iter().map(|p| Point2::new(p.x, p.y)))?;
    let mut mesh = extrude_profile(&profile, record.thickness)?;

    let local_center = mesh.bounding_box().center();
    mesh.translate(-local_center.coords);

    Ok(ExtrusionGeometry {
        mesh,
        center: Point3::from(record.position.to_array()) + local_center.coords,
    })
}

/// Extrude a 2D profile along +Z from `z = 0` to `z = depth`
pub fn extrude_profile(profile: &Profile2D, depth: f64) -> Result<Mesh> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(Error::InvalidExtrusion(format!(
            "depth must be positive, got {}",
            depth
        )));
    }

    let triangulation = profile.triangulate()?;

    let n = profile.outer.len();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + n * 4,
        triangulation.indices.len() * 2 + n * 6,
    );

    create_cap_mesh(&triangulation, 0.0, Vector3::new(0.0, 0.0, -1.0), &mut mesh);
    create_cap_mesh(&triangulation, depth, Vector3::new(0.0, 0.0, 1.0), &mut mesh);
    create_side_walls(&profile.outer, depth, &mut mesh);

    Ok(mesh)
}

/// Create a cap mesh (top or bottom) from triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, normal: Vector3<f64>, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // Bottom cap faces -Z
        if normal.z < 0.0 {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create side walls for a counter-clockwise boundary, normals facing out
#[inline]
fn create_side_walls(boundary: &[Point2<f64>], depth: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();

        let p0 = &boundary[i];
        let p1 = &boundary[j];

        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(Point3::new(p0.x, p0.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, depth), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, depth), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }
}
