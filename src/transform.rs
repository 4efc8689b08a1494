//! Stateless rigid-transform math on [`Pose`] values.
//!
//! Everything here is a pure function so the change-tracked store can be
//! cross-checked against independent recomputation in tests.

use crate::types::{Pose, Tolerance};

/// Default per-component translation tolerance in millimeters.
pub const POSITION_EPSILON: f64 = 1e-6;

/// Default per-component quaternion tolerance.
pub const ORIENTATION_EPSILON: f64 = 1e-6;

/// Quaternions with a norm below this are degenerate and rejected.
pub const DEGENERATE_NORM: f64 = 1e-12;

/// Hamilton product a * b for quaternions in [qx, qy, qz, qw] order.
pub fn quaternion_multiply(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Euclidean norm of a quaternion.
pub fn quaternion_norm(q: [f64; 4]) -> f64 {
    (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt()
}

/// Scale a quaternion to unit length. Returns `None` for a degenerate
/// (zero-norm) input; callers turn that into an `InvalidPose` error.
pub fn normalize_quaternion(q: [f64; 4]) -> Option<[f64; 4]> {
    let norm = quaternion_norm(q);
    if norm < DEGENERATE_NORM {
        return None;
    }
    Some([q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm])
}

/// Rotate a vector by a unit quaternion: v' = v + 2 qv x (qv x v + qw v).
pub fn rotate_vector(q: [f64; 4], v: [f64; 3]) -> [f64; 3] {
    let qv = [q[0], q[1], q[2]];
    let qw = q[3];
    let t = [
        2.0 * (qv[1] * v[2] - qv[2] * v[1]),
        2.0 * (qv[2] * v[0] - qv[0] * v[2]),
        2.0 * (qv[0] * v[1] - qv[1] * v[0]),
    ];
    [
        v[0] + qw * t[0] + qv[1] * t[2] - qv[2] * t[1],
        v[1] + qw * t[1] + qv[2] * t[0] - qv[0] * t[2],
        v[2] + qw * t[2] + qv[0] * t[1] - qv[1] * t[0],
    ]
}

/// Rigid-transform composition a ∘ b.
///
/// `b` is expressed in `a`'s frame: the result translation is `a`'s
/// translation plus `b`'s translation rotated into `a`'s frame, and the
/// result rotation is the (renormalized) quaternion product. This is the
/// order that applies a tip offset in the sensor's own frame:
/// `effective = raw ∘ tip_offset`.
pub fn compose(a: &Pose, b: &Pose) -> Pose {
    let rotated = rotate_vector(a.rotation, b.translation);
    let product = quaternion_multiply(a.rotation, b.rotation);
    Pose {
        translation: [
            a.translation[0] + rotated[0],
            a.translation[1] + rotated[1],
            a.translation[2] + rotated[2],
        ],
        // Unit inputs keep the product away from zero; renormalize to
        // stop drift from accumulating over repeated composition.
        rotation: normalize_quaternion(product).unwrap_or(product),
    }
}

/// Component-wise tolerance comparison of two poses.
pub fn approx_eq(a: &Pose, b: &Pose, tol: Tolerance) -> bool {
    for i in 0..3 {
        if (a.translation[i] - b.translation[i]).abs() >= tol.position {
            return false;
        }
    }
    for i in 0..4 {
        if (a.rotation[i] - b.rotation[i]).abs() >= tol.orientation {
            return false;
        }
    }
    true
}
