//! Rigid alignment utilities (Kabsch)

use glam::{DMat3, DVec3};
use thiserror::Error;

use crate::svd::svd3;

/// The second singular value of the cross-covariance must exceed this
/// fraction of the first, otherwise the correspondences are collinear.
const DEGENERACY_EPSILON: f64 = 1e-10;

/// Error type for rigid alignment operations.
#[derive(Debug, Error)]
pub enum RigidError {
    /// Local and global arrays must have the same length
    #[error("Local and global arrays must have the same length ({0} != {1})")]
    MismatchedInputLengths(usize, usize),

    /// The correspondences do not determine a unique rotation
    #[error("Degenerate correspondence set: {0}")]
    DegenerateCorrespondence(String),
}

/// A proper rotation followed by a translation: `p' = R * p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    // Row-major 3x3 rotation with determinant +1.
    rotation: [[f64; 3]; 3],
    translation: [f64; 3],
}

impl RigidTransform {
    /// Create a transform from a row-major rotation matrix and a translation.
    ///
    /// PRECONDITION: `rotation` is orthonormal with determinant +1.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::new(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [0.0; 3],
        )
    }

    /// The row-major rotation matrix.
    pub fn rotation(&self) -> &[[f64; 3]; 3] {
        &self.rotation
    }

    /// The translation vector.
    pub fn translation(&self) -> &[f64; 3] {
        &self.translation
    }

    /// Map a point: `R * p + t`.
    #[inline]
    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            r[0][0] * p[0] + r[0][1] * p[1] + r[0][2] * p[2] + t[0],
            r[1][0] * p[0] + r[1][1] * p[1] + r[1][2] * p[2] + t[1],
            r[2][0] * p[0] + r[2][1] * p[1] + r[2][2] * p[2] + t[2],
        ]
    }

    /// The inverse transform: `R^T * (p - t)`.
    pub fn inverse(&self) -> Self {
        let r = to_mat3(&self.rotation).transpose();
        let t = -(r * DVec3::from_array(self.translation));
        Self::new(from_mat3(&r), t.to_array())
    }

    /// Euler angles `[roll, pitch, yaw]` in radians for extrinsic rotations
    /// about x, then y, then z, i.e. `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn euler_angles_xyz(&self) -> [f64; 3] {
        let r = &self.rotation;
        let pitch = (-r[2][0]).clamp(-1.0, 1.0).asin();
        if r[2][0].abs() < 1.0 - 1e-12 {
            let roll = r[2][1].atan2(r[2][2]);
            let yaw = r[1][0].atan2(r[0][0]);
            [roll, pitch, yaw]
        } else {
            // gimbal lock: only roll - yaw (or roll + yaw) is observable
            let yaw = (-r[0][1]).atan2(r[1][1]);
            [0.0, pitch, yaw]
        }
    }

    /// Root mean squared residual `|R * local_i + t - global_i|` over a
    /// correspondence set.
    pub fn rmse(&self, local: &[[f64; 3]], global: &[[f64; 3]]) -> Result<f64, RigidError> {
        if local.len() != global.len() {
            return Err(RigidError::MismatchedInputLengths(local.len(), global.len()));
        }
        if local.is_empty() {
            return Ok(0.0);
        }
        let sum_sq: f64 = local
            .iter()
            .zip(global)
            .map(|(l, g)| {
                let p = self.apply(*l);
                DVec3::from_array(p).distance_squared(DVec3::from_array(*g))
            })
            .sum();
        Ok((sum_sq / local.len() as f64).sqrt())
    }
}

/// Estimate the rigid transform mapping `local` points onto `global` points.
///
/// Kabsch algorithm: the rotation comes from the SVD of the cross-covariance
/// `H = A^T * B` of the centred point sets as `R = V * U^T`. When that
/// candidate is a reflection the last right singular vector is flipped, so the
/// result always has determinant +1. No scale is estimated.
///
/// # Arguments
///
/// * `local` - Points in the source frame.
/// * `global` - The same points in the target frame, matched by index.
///
/// # Returns
///
/// The transform minimising `sum |R * local_i + t - global_i|^2`.
///
/// Example:
///
/// ```
/// use geopcd_linalg::estimate_rigid_transform;
///
/// let local = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let global = local.map(|p| [p[0] + 10.0, p[1], p[2]]);
/// let transform = estimate_rigid_transform(&local, &global).unwrap();
/// assert!((transform.translation()[0] - 10.0).abs() < 1e-9);
/// ```
pub fn estimate_rigid_transform(
    local: &[[f64; 3]],
    global: &[[f64; 3]],
) -> Result<RigidTransform, RigidError> {
    if local.len() != global.len() {
        return Err(RigidError::MismatchedInputLengths(local.len(), global.len()));
    }
    if local.len() < 3 {
        return Err(RigidError::DegenerateCorrespondence(format!(
            "need at least 3 correspondences, got {}",
            local.len()
        )));
    }
    if local.iter().chain(global).flatten().any(|v| !v.is_finite()) {
        return Err(RigidError::DegenerateCorrespondence(
            "non-finite coordinate".into(),
        ));
    }

    let n = local.len() as f64;
    let centroid_local = local.iter().map(|p| DVec3::from_array(*p)).sum::<DVec3>() / n;
    let centroid_global = global.iter().map(|p| DVec3::from_array(*p)).sum::<DVec3>() / n;

    // H = sum (local_i - c_local) * (global_i - c_global)^T
    let mut h = DMat3::ZERO;
    for (l, g) in local.iter().zip(global) {
        let a = DVec3::from_array(*l) - centroid_local;
        let b = DVec3::from_array(*g) - centroid_global;
        h += DMat3::from_cols(a * b.x, a * b.y, a * b.z);
    }

    let svd = svd3(&h);
    let s = svd.s();
    if s.x == 0.0 || s.y <= DEGENERACY_EPSILON * s.x {
        return Err(RigidError::DegenerateCorrespondence(format!(
            "points are collinear or coincident (singular values {s})"
        )));
    }

    let u = *svd.u();
    let v = *svd.v();

    let mut r = v * u.transpose();
    if r.determinant() < 0.0 {
        log::debug!("Kabsch candidate is a reflection, flipping the last singular vector");
        let v_corrected = DMat3::from_cols(v.x_axis, v.y_axis, -v.z_axis);
        r = v_corrected * u.transpose();
    }

    let t = centroid_global - r * centroid_local;

    Ok(RigidTransform::new(from_mat3(&r), t.to_array()))
}

fn to_mat3(m: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(m[0][0], m[1][0], m[2][0]),
        DVec3::new(m[0][1], m[1][1], m[2][1]),
        DVec3::new(m[0][2], m[1][2], m[2][2]),
    )
}

fn from_mat3(m: &DMat3) -> [[f64; 3]; 3] {
    [m.row(0).to_array(), m.row(1).to_array(), m.row(2).to_array()]
}
