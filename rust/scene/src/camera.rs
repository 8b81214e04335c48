// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! View/Camera: perspective and orthographic cameras, the six canonical
//! views and fitting.
//!
//! Model space is Y-up. A [`CameraRig`] owns one camera per mode; toggling
//! copies position and orientation from the active camera to the other one
//! so the view does not jump.

use nalgebra::{
    Isometry3, Matrix4, Orthographic3, Perspective3, Point2, Point3, UnitQuaternion, Vector3,
};
use panelview_geometry::{Axis, Box3, Ray};

use crate::config::ViewerConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Perspective,
    Orthographic,
}

/// The six canonical views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewDirection {
    /// Looking along -Z
    #[default]
    Front,
    /// Looking along +Z
    Back,
    /// Looking down -Y
    Top,
    /// Looking up +Y
    Bottom,
    /// Looking along +X
    Left,
    /// Looking along -X
    Right,
}

impl ViewDirection {
    pub const ALL: [ViewDirection; 6] = [
        ViewDirection::Front,
        ViewDirection::Back,
        ViewDirection::Top,
        ViewDirection::Bottom,
        ViewDirection::Left,
        ViewDirection::Right,
    ];

    /// Unit vector from the target towards the eye
    pub fn normal(&self) -> Vector3<f64> {
        match self {
            ViewDirection::Front => Vector3::z(),
            ViewDirection::Back => -Vector3::z(),
            ViewDirection::Top => Vector3::y(),
            ViewDirection::Bottom => -Vector3::y(),
            ViewDirection::Left => -Vector3::x(),
            ViewDirection::Right => Vector3::x(),
        }
    }

    /// Screen-up direction
    pub fn up(&self) -> Vector3<f64> {
        match self {
            ViewDirection::Top => -Vector3::z(),
            ViewDirection::Bottom => Vector3::z(),
            _ => Vector3::y(),
        }
    }

    /// Screen-right direction
    pub fn right(&self) -> Vector3<f64> {
        (-self.normal()).cross(&self.up())
    }

    /// Model axes shown horizontally and vertically on screen
    pub fn axes(&self) -> (Axis, Axis) {
        match self {
            ViewDirection::Front | ViewDirection::Back => (Axis::X, Axis::Y),
            ViewDirection::Top | ViewDirection::Bottom => (Axis::X, Axis::Z),
            ViewDirection::Left | ViewDirection::Right => (Axis::Z, Axis::Y),
        }
    }

    /// Model axis pointing at the viewer
    pub fn depth_axis(&self) -> Axis {
        match self {
            ViewDirection::Front | ViewDirection::Back => Axis::Z,
            ViewDirection::Top | ViewDirection::Bottom => Axis::Y,
            ViewDirection::Left | ViewDirection::Right => Axis::X,
        }
    }

    /// Canonical view closest to looking along `forward`
    pub fn nearest(forward: &Vector3<f64>) -> Self {
        let toward_eye = -forward;
        let mut best = ViewDirection::Front;
        let mut best_dot = f64::NEG_INFINITY;
        for dir in Self::ALL {
            let d = dir.normal().dot(&toward_eye);
            if d > best_dot {
                best = dir;
                best_dot = d;
            }
        }
        best
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewDirection::Front => "front",
            ViewDirection::Back => "back",
            ViewDirection::Top => "top",
            ViewDirection::Bottom => "bottom",
            ViewDirection::Left => "left",
            ViewDirection::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians
        fov_y: f64,
    },
    Orthographic {
        half_width: f64,
        half_height: f64,
    },
}

/// Look-at camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub projection: Projection,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub fn mode(&self) -> CameraMode {
        match self.projection {
            Projection::Perspective { .. } => CameraMode::Perspective,
            Projection::Orthographic { .. } => CameraMode::Orthographic,
        }
    }

    /// Unit view direction (eye to target)
    pub fn forward(&self) -> Vector3<f64> {
        (self.target - self.position)
            .try_normalize(1e-12)
            .unwrap_or_else(|| -Vector3::z())
    }

    pub fn right(&self) -> Vector3<f64> {
        self.forward()
            .cross(&self.up)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::x)
    }

    /// Up vector orthogonal to the view direction
    pub fn true_up(&self) -> Vector3<f64> {
        self.right().cross(&self.forward())
    }

    pub fn distance(&self) -> f64 {
        (self.target - self.position).norm()
    }

    /// World orientation of the camera (maps -Z to the view direction)
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::look_at_rh(&self.forward(), &self.up).inverse()
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Isometry3::look_at_rh(&self.position, &self.target, &self.up).to_homogeneous()
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        match self.projection {
            Projection::Perspective { fov_y } => {
                Perspective3::new(self.aspect, fov_y, self.near, self.far).to_homogeneous()
            }
            Projection::Orthographic {
                half_width,
                half_height,
            } => Orthographic3::new(
                -half_width,
                half_width,
                -half_height,
                half_height,
                self.near,
                self.far,
            )
            .to_homogeneous(),
        }
    }

    pub fn view_projection(&self) -> Matrix4<f64> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Normalized device coordinates of a point, `None` behind the camera
    pub fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let clip = self.view_projection() * point.to_homogeneous();
        if clip.w <= 1e-12 {
            return None;
        }
        Some(Point2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Picking ray through a point in normalized device coordinates
    /// (`-1..1` on both axes, +Y up)
    pub fn ray_through(&self, ndc: Point2<f64>) -> Option<Ray> {
        let forward = self.forward();
        let right = self.right();
        let up = self.true_up();
        match self.projection {
            Projection::Perspective { fov_y } => {
                let tan = (fov_y / 2.0).tan();
                let dir = forward + right * (ndc.x * tan * self.aspect) + up * (ndc.y * tan);
                Ray::new(self.position, dir)
            }
            Projection::Orthographic {
                half_width,
                half_height,
            } => {
                let origin = self.position + right * (ndc.x * half_width) + up * (ndc.y * half_height);
                Ray::new(origin, forward)
            }
        }
    }
}

/// Orthographic half extents framing a `width` x `height` area
fn ortho_frustum(width: f64, height: f64, aspect: f64, padding: f64) -> (f64, f64) {
    let size = width.max(height) * padding;
    if aspect >= 1.0 {
        let half_height = size / 2.0;
        (half_height * aspect, half_height)
    } else {
        let half_width = size / 2.0;
        (half_width, half_width / aspect)
    }
}

/// Perspective and orthographic cameras with the active mode
#[derive(Debug, Clone)]
pub struct CameraRig {
    perspective: Camera,
    orthographic: Camera,
    mode: CameraMode,
    view: Option<ViewDirection>,
    viewport: (f64, f64),
    revision: u64,

    min_fit_distance: f64,
    fit_padding: f64,
    ortho_padding: f64,
}

impl CameraRig {
    pub fn new(config: &ViewerConfig) -> Self {
        let view = ViewDirection::Front;
        let distance = config.min_fit_distance.max(1.0) * 10.0;
        let base = Camera {
            position: Point3::from(view.normal() * distance),
            target: Point3::origin(),
            up: view.up(),
            projection: Projection::Perspective {
                fov_y: config.fov_degrees.to_radians(),
            },
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        let half = distance / 2.0;
        let orthographic = Camera {
            projection: Projection::Orthographic {
                half_width: half,
                half_height: half,
            },
            ..base.clone()
        };

        Self {
            perspective: base,
            orthographic,
            mode: CameraMode::Perspective,
            view: None,
            viewport: (1.0, 1.0),
            revision: 0,
            min_fit_distance: config.min_fit_distance,
            fit_padding: config.fit_padding,
            ortho_padding: config.ortho_padding,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn active(&self) -> &Camera {
        match self.mode {
            CameraMode::Perspective => &self.perspective,
            CameraMode::Orthographic => &self.orthographic,
        }
    }

    pub fn perspective(&self) -> &Camera {
        &self.perspective
    }

    pub fn orthographic(&self) -> &Camera {
        &self.orthographic
    }

    /// Canonical view last set, or the one closest to the current direction
    pub fn view_direction(&self) -> ViewDirection {
        self.view
            .unwrap_or_else(|| ViewDirection::nearest(&self.active().forward()))
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    /// Bumped on every camera change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn aspect(&self) -> f64 {
        self.perspective.aspect
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Switch between perspective and orthographic
    pub fn toggle_mode(&mut self) -> CameraMode {
        match self.mode {
            CameraMode::Perspective => {
                let src = &self.perspective;
                // Frame what the perspective camera sees at the target distance
                let fov_y = match src.projection {
                    Projection::Perspective { fov_y } => fov_y,
                    Projection::Orthographic { .. } => std::f64::consts::FRAC_PI_4,
                };
                let half_height = src.distance() * (fov_y / 2.0).tan();
                self.orthographic.position = src.position;
                self.orthographic.target = src.target;
                self.orthographic.up = src.up;
                self.orthographic.projection = Projection::Orthographic {
                    half_width: half_height * src.aspect,
                    half_height,
                };
                self.mode = CameraMode::Orthographic;
            }
            CameraMode::Orthographic => {
                self.perspective.position = self.orthographic.position;
                self.perspective.target = self.orthographic.target;
                self.perspective.up = self.orthographic.up;
                self.mode = CameraMode::Perspective;
            }
        }
        self.touch();
        tracing::debug!(mode = ?self.mode, "Camera mode toggled");
        self.mode
    }

    /// Look at `bounds` from a canonical direction. Empty bounds leave the
    /// camera untouched.
    pub fn set_view(&mut self, view: ViewDirection, bounds: &Box3) -> Result<()> {
        if bounds.is_empty() {
            return Err(Error::DegenerateBounds("view"));
        }

        let center = bounds.center();
        let size = bounds.size();
        let (h_axis, v_axis) = view.axes();
        let width = size[h_axis.index()];
        let height = size[v_axis.index()];
        let depth = size[view.depth_axis().index()];

        let (tan_v, tan_h) = self.half_angle_tangents();
        let fit = (height / 2.0 / tan_v).max(width / 2.0 / tan_h) * self.fit_padding + depth / 2.0;
        let distance = fit.max(self.min_fit_distance);

        let position = center + view.normal() * distance;
        let frustum = ortho_frustum(width, height, self.aspect(), self.ortho_padding);
        self.place(position, center, view.up(), frustum);
        self.view = Some(view);

        tracing::debug!(view = view.as_str(), distance, "Camera view set");
        Ok(())
    }

    /// Frame `bounds` keeping the current view direction
    pub fn fit_bounds(&mut self, bounds: &Box3) -> Result<()> {
        if bounds.is_empty() {
            return Err(Error::DegenerateBounds("fit"));
        }

        let center = bounds.center();
        let radius = bounds.diagonal() / 2.0;
        let (tan_v, tan_h) = self.half_angle_tangents();
        let fit = radius / tan_v.min(tan_h) * self.fit_padding;
        let distance = fit.max(self.min_fit_distance);

        let active = self.active();
        let forward = active.forward();
        let up = active.up;
        let position = center - forward * distance;
        let diameter = radius * 2.0;
        let frustum = ortho_frustum(diameter, diameter, self.aspect(), self.ortho_padding);
        self.place(position, center, up, frustum);

        tracing::debug!(distance, "Camera fitted to bounds");
        Ok(())
    }

    fn half_angle_tangents(&self) -> (f64, f64) {
        let fov_y = match self.perspective.projection {
            Projection::Perspective { fov_y } => fov_y,
            Projection::Orthographic { .. } => std::f64::consts::FRAC_PI_4,
        };
        let tan_v = (fov_y / 2.0).tan();
        (tan_v, tan_v * self.aspect())
    }

    /// Move both cameras. Floors the frustum at a millimetre so flat
    /// content still gets a usable projection.
    fn place(
        &mut self,
        position: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        (half_width, half_height): (f64, f64),
    ) {
        for camera in [&mut self.perspective, &mut self.orthographic] {
            camera.position = position;
            camera.target = target;
            camera.up = up;
        }
        self.orthographic.projection = Projection::Orthographic {
            half_width: half_width.max(1.0),
            half_height: half_height.max(1.0),
        };
        self.touch();
    }

    /// Resize. The orthographic height is kept and its width follows the
    /// new aspect.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0) {
            tracing::debug!(width, height, "Ignoring empty viewport");
            return;
        }
        let aspect = width / height;
        self.viewport = (width, height);
        self.perspective.aspect = aspect;
        self.orthographic.aspect = aspect;
        if let Projection::Orthographic { half_height, .. } = self.orthographic.projection {
            self.orthographic.projection = Projection::Orthographic {
                half_width: half_height * aspect,
                half_height,
            };
        }
        self.touch();
    }

    /// Back to the initial cameras, keeping the viewport
    pub fn reset(&mut self, config: &ViewerConfig) {
        let (width, height) = self.viewport;
        let revision = self.revision;
        *self = Self::new(config);
        self.revision = revision;
        self.set_viewport(width, height);
    }
}
