// One-sided (Hestenes) Jacobi SVD specialised to 3x3 matrices in f64.
use glam::{DMat3, DVec3};

/// Sweeps over the three column pairs before giving up on convergence.
const MAX_SWEEPS: usize = 32;

/// Singular values below this fraction of the largest one are treated as zero
/// when completing the left singular basis.
const RANK_EPSILON: f64 = 1e-12;

/// The factors of `A = U * diag(S) * V^T`.
#[derive(Debug, Clone, Copy)]
pub struct Svd3 {
    /// The matrix of left singular vectors.
    u: DMat3,

    /// The singular values, sorted in descending order.
    s: DVec3,

    /// The matrix of right singular vectors.
    v: DMat3,
}

impl Svd3 {
    /// Get the left singular vectors matrix.
    #[inline]
    pub fn u(&self) -> &DMat3 {
        &self.u
    }

    /// Get the singular values, largest first.
    #[inline]
    pub fn s(&self) -> &DVec3 {
        &self.s
    }

    /// Get the right singular vectors matrix.
    #[inline]
    pub fn v(&self) -> &DMat3 {
        &self.v
    }
}

/// Compute the singular value decomposition of a 3x3 matrix.
///
/// Columns of `A` are orthogonalised in place by plane rotations which are
/// accumulated into `V`; the column norms are then the singular values and
/// the normalised columns form `U`. `U` and `V` are orthogonal but either may
/// have determinant -1.
pub fn svd3(a: &DMat3) -> Svd3 {
    let mut w = [a.x_axis, a.y_axis, a.z_axis];
    let mut v = [DVec3::X, DVec3::Y, DVec3::Z];

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;

        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            let alpha = w[p].length_squared();
            let beta = w[q].length_squared();
            let gamma = w[p].dot(w[q]);

            if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                continue;
            }
            rotated = true;

            // smaller root of t^2 + 2 * zeta * t - 1 = 0
            let zeta = (beta - alpha) / (2.0 * gamma);
            let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
            let c = 1.0 / (1.0 + t * t).sqrt();
            let s = c * t;

            let (wp, wq) = (w[p], w[q]);
            w[p] = c * wp - s * wq;
            w[q] = s * wp + c * wq;

            let (vp, vq) = (v[p], v[q]);
            v[p] = c * vp - s * vq;
            v[q] = s * vp + c * vq;
        }

        if !rotated {
            break;
        }
    }

    // sort by descending singular value
    let mut order = [0usize, 1, 2];
    let norms = [w[0].length(), w[1].length(), w[2].length()];
    order.sort_by(|&i, &j| norms[j].total_cmp(&norms[i]));

    let s = DVec3::new(norms[order[0]], norms[order[1]], norms[order[2]]);
    let w = [w[order[0]], w[order[1]], w[order[2]]];
    let v = DMat3::from_cols(v[order[0]], v[order[1]], v[order[2]]);

    let u = if s.x == 0.0 {
        DMat3::IDENTITY
    } else {
        let tol = s.x * RANK_EPSILON;
        let u0 = w[0] / s.x;
        let u1 = if s.y > tol {
            w[1] / s.y
        } else {
            u0.any_orthonormal_vector()
        };
        let u2 = if s.z > tol { w[2] / s.z } else { u0.cross(u1) };
        DMat3::from_cols(u0, u1, u2)
    };

    Svd3 { u, s, v }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    /// Helper function to validate all critical SVD properties
    fn verify_svd_properties(a: &DMat3, svd: &Svd3) {
        let s_mat = DMat3::from_diagonal(svd.s);

        // Reconstruction (A = U * S * V.T)
        let reconstruction = svd.u * s_mat * svd.v.transpose();
        assert!(
            a.abs_diff_eq(reconstruction, EPSILON * a.x_axis.abs().max_element().max(1.0) * 10.0),
            "Reconstruction failed: A != U*S*V.T\nA:\n{a}\nReconstruction:\n{reconstruction}"
        );

        // U and V are orthogonal
        let u_t_u = svd.u.transpose() * svd.u;
        assert!(DMat3::IDENTITY.abs_diff_eq(u_t_u, EPSILON), "U.T*U:\n{u_t_u}");
        let v_t_v = svd.v.transpose() * svd.v;
        assert!(DMat3::IDENTITY.abs_diff_eq(v_t_v, EPSILON), "V.T*V:\n{v_t_v}");

        // Singular values are non-negative and sorted
        assert!(svd.s.min_element() >= 0.0, "negative singular value: {}", svd.s);
        assert!(
            svd.s.x >= svd.s.y && svd.s.y >= svd.s.z,
            "Singular values are not sorted: {}",
            svd.s
        );
    }

    #[test]
    fn test_svd3_diagonal_unsorted() {
        let a = DMat3::from_diagonal(DVec3::new(2.0, 3.0, 1.0));
        let svd = svd3(&a);
        verify_svd_properties(&a, &svd);
        assert!(svd.s.abs_diff_eq(DVec3::new(3.0, 2.0, 1.0), EPSILON));
    }

    #[test]
    fn test_svd3_zero() {
        let a = DMat3::ZERO;
        let svd = svd3(&a);
        verify_svd_properties(&a, &svd);
        assert_eq!(svd.s, DVec3::ZERO);
    }

    #[test]
    fn test_svd3_rotation_matrix() {
        let a = DMat3::from_rotation_y(std::f64::consts::FRAC_PI_4);
        let svd = svd3(&a);
        verify_svd_properties(&a, &svd);
        assert!(svd.s.abs_diff_eq(DVec3::ONE, EPSILON));
    }

    #[test]
    fn test_svd3_singular_rank1() {
        let a = DMat3::from_cols(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(2.0, 4.0, 6.0),
            DVec3::new(3.0, 6.0, 9.0),
        );
        let svd = svd3(&a);
        verify_svd_properties(&a, &svd);
        assert!(svd.s.x > 1.0);
        assert!(svd.s.y < EPSILON);
        assert!(svd.s.z < EPSILON);
    }

    #[test]
    fn test_svd3_singular_rank2() {
        let a = DMat3::from_cols(
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
        );
        let svd = svd3(&a);
        verify_svd_properties(&a, &svd);
        assert!(svd.s.y > 1.0);
        assert!(svd.s.z < EPSILON);
    }

    #[test]
    fn test_svd3_general_full_rank() {
        let a = DMat3::from_cols(
            DVec3::new(4.0, -2.0, 1.0),
            DVec3::new(3.0, 6.0, -4.0),
            DVec3::new(2.0, 1.0, 8.0),
        );
        let svd = svd3(&a);
        verify_svd_properties(&a, &svd);
        let det_product = svd.s.x * svd.s.y * svd.s.z;
        assert!((det_product - a.determinant().abs()).abs() < 1e-9);
    }
}
