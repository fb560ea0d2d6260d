// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal 2D affine transform.
//!
//! This type covers the subset of 2-D affine math the scene graph actually
//! needs (point mapping, in-place composition, TRS+skew build/decompose,
//! inversion) without pulling in a full linear-algebra crate. The component
//! layout and composition order follow the classic display-list convention:
//! `(a, b, c, d, tx, ty)` stands for the matrix
//! `[[a, c, tx], [b, d, ty], [0, 0, 1]]`.

use kurbo::{Point, Vec2};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Tolerance below which a decomposed skew pair collapses to pure rotation.
const SKEW_EPSILON: f64 = 1e-5;

/// A 2D affine transform with a dirty flag.
///
/// Every mutating operation sets [`require_update`](Self::require_update);
/// owners that derive data from the matrix call [`update`](Self::update)
/// once they have consumed the new values.
#[derive(Clone, Copy, Debug)]
pub struct Matrix {
    /// X-axis scale / rotation term.
    pub a: f64,
    /// X-axis shear term.
    pub b: f64,
    /// Y-axis shear term.
    pub c: f64,
    /// Y-axis scale / rotation term.
    pub d: f64,
    /// X translation.
    pub tx: f64,
    /// Y translation.
    pub ty: f64,
    /// Set by every mutating operation, cleared by [`update`](Self::update).
    pub require_update: bool,
}

/// The result of [`Matrix::decompose`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    /// Translation.
    pub position: Point,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Per-axis skew in radians (zero on the no-skew fast path).
    pub skew: Vec2,
    /// Rotation in radians (zero when the skew terms diverge).
    pub rotation: f64,
}

impl Matrix {
    /// The identity matrix, with a clear dirty flag.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
        require_update: false,
    };

    /// Creates a matrix from the six affine components.
    #[inline]
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self {
            a,
            b,
            c,
            d,
            tx,
            ty,
            require_update: true,
        }
    }

    /// Returns the six components as `[a, b, c, d, tx, ty]`.
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    /// Clears the dirty flag.
    #[inline]
    pub fn update(&mut self) {
        self.require_update = false;
    }

    /// Resets to the identity matrix.
    pub fn set_identity(&mut self) {
        self.a = 1.0;
        self.b = 0.0;
        self.c = 0.0;
        self.d = 1.0;
        self.tx = 0.0;
        self.ty = 0.0;
        self.require_update = true;
    }

    /// Copies all components from `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.a = other.a;
        self.b = other.b;
        self.c = other.c;
        self.d = other.d;
        self.tx = other.tx;
        self.ty = other.ty;
        self.require_update = true;
    }

    /// Maps a point through this transform.
    #[inline]
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Maps a point through the inverse of this transform.
    ///
    /// A singular matrix (zero determinant) produces `Infinity`/`NaN`
    /// coordinates; there is no guard here and the caller must check
    /// finiteness when the matrix may be degenerate.
    #[inline]
    #[must_use]
    pub fn apply_inverse(&self, p: Point) -> Point {
        let id = 1.0 / (self.a * self.d + self.c * -self.b);
        Point::new(
            self.d * id * p.x - self.c * id * p.y + (self.ty * self.c - self.tx * self.d) * id,
            self.a * id * p.y - self.b * id * p.x + (-self.ty * self.a + self.tx * self.b) * id,
        )
    }

    /// Translates by `(x, y)` after the current transform.
    pub fn translate(&mut self, x: f64, y: f64) {
        self.tx += x;
        self.ty += y;
        self.require_update = true;
    }

    /// Scales by `(x, y)` after the current transform.
    pub fn scale(&mut self, x: f64, y: f64) {
        self.a *= x;
        self.d *= y;
        self.c *= x;
        self.b *= y;
        self.tx *= x;
        self.ty *= y;
        self.require_update = true;
    }

    /// Rotates by `angle` radians after the current transform.
    pub fn rotate(&mut self, angle: f64) {
        let (sin, cos) = (angle.sin(), angle.cos());
        let a1 = self.a;
        let c1 = self.c;
        let tx1 = self.tx;

        self.a = a1 * cos - self.b * sin;
        self.b = a1 * sin + self.b * cos;
        self.c = c1 * cos - self.d * sin;
        self.d = c1 * sin + self.d * cos;
        self.tx = tx1 * cos - self.ty * sin;
        self.ty = tx1 * sin + self.ty * cos;
        self.require_update = true;
    }

    /// Appends `m`, so that the composed transform maps a point through `m`
    /// first and then through the previous value of `self`.
    ///
    /// A world transform is built as `parent.append(local)`.
    pub fn append(&mut self, m: &Self) {
        let a1 = self.a;
        let b1 = self.b;
        let c1 = self.c;
        let d1 = self.d;

        self.a = m.a * a1 + m.b * c1;
        self.b = m.a * b1 + m.b * d1;
        self.c = m.c * a1 + m.d * c1;
        self.d = m.c * b1 + m.d * d1;
        self.tx = m.tx * a1 + m.ty * c1 + self.tx;
        self.ty = m.tx * b1 + m.ty * d1 + self.ty;
        self.require_update = true;
    }

    /// Prepends `m`, so that the composed transform maps a point through the
    /// previous value of `self` first and then through `m`.
    ///
    /// `local.prepend(parent)` and `parent.append(local)` produce the same
    /// world transform.
    pub fn prepend(&mut self, m: &Self) {
        let tx1 = self.tx;

        if m.a != 1.0 || m.b != 0.0 || m.c != 0.0 || m.d != 1.0 {
            let a1 = self.a;
            let c1 = self.c;

            self.a = a1 * m.a + self.b * m.c;
            self.b = a1 * m.b + self.b * m.d;
            self.c = c1 * m.a + self.d * m.c;
            self.d = c1 * m.b + self.d * m.d;
        }
        self.tx = tx1 * m.a + self.ty * m.c + m.tx;
        self.ty = tx1 * m.b + self.ty * m.d + m.ty;
        self.require_update = true;
    }

    /// Builds the matrix directly from a decomposed TRS+skew description.
    ///
    /// The pivot is subtracted in the rotated/scaled frame so that the node
    /// rotates and scales around `(pivot_x, pivot_y)` while `(x, y)` stays
    /// the world position of the pivot.
    pub fn set_transform(
        &mut self,
        x: f64,
        y: f64,
        pivot_x: f64,
        pivot_y: f64,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
        skew_x: f64,
        skew_y: f64,
    ) {
        self.a = (rotation + skew_y).cos() * scale_x;
        self.b = (rotation + skew_y).sin() * scale_x;
        self.c = -((rotation - skew_x).sin()) * scale_y;
        self.d = (rotation - skew_x).cos() * scale_y;
        self.tx = x - (pivot_x * self.a + pivot_y * self.c);
        self.ty = y - (pivot_x * self.b + pivot_y * self.d);
        self.require_update = true;
    }

    /// Extracts position, scale, skew, and rotation from the components.
    ///
    /// When the two skew angles cancel (within 1e-5) the result reports a
    /// pure rotation with zero skew; otherwise rotation is folded into the
    /// skew pair.
    #[must_use]
    pub fn decompose(&self) -> Decomposed {
        let skew_x = -((-self.c).atan2(self.d));
        let skew_y = self.b.atan2(self.a);

        let delta = (skew_x + skew_y).abs();
        let (rotation, skew) =
            if delta < SKEW_EPSILON || (core::f64::consts::TAU - delta).abs() < SKEW_EPSILON {
                (skew_y, Vec2::ZERO)
            } else {
                (0.0, Vec2::new(skew_x, skew_y))
            };

        Decomposed {
            position: Point::new(self.tx, self.ty),
            scale: Vec2::new(
                (self.a * self.a + self.b * self.b).sqrt(),
                (self.c * self.c + self.d * self.d).sqrt(),
            ),
            skew,
            rotation,
        }
    }

    /// Inverts the matrix in place.
    ///
    /// As with [`apply_inverse`](Self::apply_inverse), a singular matrix
    /// produces non-finite components rather than an error.
    pub fn invert(&mut self) {
        let a1 = self.a;
        let b1 = self.b;
        let c1 = self.c;
        let d1 = self.d;
        let tx1 = self.tx;
        let ty1 = self.ty;
        let n = a1 * d1 - b1 * c1;

        self.a = d1 / n;
        self.b = -b1 / n;
        self.c = -c1 / n;
        self.d = a1 / n;
        self.tx = (c1 * ty1 - d1 * tx1) / n;
        self.ty = -(a1 * ty1 - b1 * tx1) / n;
        self.require_update = true;
    }
}

impl Default for Matrix {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(m: &Matrix, expected: [f64; 6]) {
        let got = m.to_array();
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-9, "expected {expected:?}, got {got:?}");
        }
    }

    #[test]
    fn default_is_identity() {
        let m = Matrix::default();
        assert_close(&m, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(!m.require_update);
    }

    #[test]
    fn mutation_sets_dirty_flag() {
        let mut m = Matrix::IDENTITY;
        m.translate(1.0, 2.0);
        assert!(m.require_update);
        m.update();
        assert!(!m.require_update);
        m.rotate(0.5);
        assert!(m.require_update);
    }

    #[test]
    fn apply_maps_points() {
        let mut m = Matrix::IDENTITY;
        m.translate(10.0, 20.0);
        m.scale(2.0, 3.0);
        let p = m.apply(Point::new(1.0, 1.0));
        // Scale is applied to the whole transform, translation included.
        assert_eq!(p, Point::new(22.0, 63.0));
    }

    #[test]
    fn apply_inverse_round_trips() {
        let mut m = Matrix::IDENTITY;
        m.set_transform(5.0, -3.0, 0.0, 0.0, 2.0, 0.5, 0.7, 0.0, 0.0);
        let p = Point::new(13.0, 42.0);
        let back = m.apply_inverse(m.apply(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn apply_inverse_singular_produces_non_finite() {
        // Collapsed onto a line: determinant is zero.
        let m = Matrix::new(1.0, 1.0, 1.0, 1.0, 0.0, 0.0);
        let p = m.apply_inverse(Point::new(1.0, 2.0));
        assert!(!p.x.is_finite() || !p.y.is_finite());
    }

    #[test]
    fn invert_composes_to_identity() {
        let mut m = Matrix::IDENTITY;
        m.set_transform(7.0, 11.0, 1.0, 2.0, 1.5, 0.75, 0.3, 0.1, 0.2);

        let mut inv = m;
        inv.invert();
        inv.append(&m);
        assert_close(&inv, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn append_then_prepend_ordering() {
        let mut t = Matrix::IDENTITY;
        t.translate(10.0, 0.0);
        let mut s = Matrix::IDENTITY;
        s.scale(2.0, 2.0);

        // append: argument applies first, self last.
        let mut a = t;
        a.append(&s);
        assert_eq!(a.apply(Point::ORIGIN), Point::new(10.0, 0.0));
        assert_eq!(a.apply(Point::new(1.0, 0.0)), Point::new(12.0, 0.0));

        // prepend: self applies first, argument last.
        let mut b = t;
        b.prepend(&s);
        assert_eq!(b.apply(Point::ORIGIN), Point::new(20.0, 0.0));
        assert_eq!(b.apply(Point::new(1.0, 0.0)), Point::new(22.0, 0.0));
    }

    #[test]
    fn set_transform_decompose_round_trip() {
        let cases = [
            (3.0, -4.0, 1.25, 0.8, 0.4, 0.0, 0.0),
            (0.0, 0.0, 1.0, 1.0, -1.2, 0.0, 0.0),
            (10.0, 5.0, 2.0, 0.5, 0.0, 0.3, 0.6),
            (-2.0, 7.5, 0.9, 1.1, 0.0, -0.25, 0.4),
        ];
        for (x, y, sx, sy, rot, kx, ky) in cases {
            let mut m = Matrix::IDENTITY;
            m.set_transform(x, y, 0.0, 0.0, sx, sy, rot, kx, ky);
            let d = m.decompose();

            assert!((d.position.x - x).abs() < 1e-5, "position.x for {rot}");
            assert!((d.position.y - y).abs() < 1e-5, "position.y for {rot}");
            assert!((d.scale.x - sx).abs() < 1e-5, "scale.x for {rot}");
            assert!((d.scale.y - sy).abs() < 1e-5, "scale.y for {rot}");
            if kx == 0.0 && ky == 0.0 {
                assert!((d.rotation - rot).abs() < 1e-5, "rotation for {rot}");
                assert_eq!(d.skew, Vec2::ZERO);
            } else {
                assert!((d.skew.x - kx).abs() < 1e-5, "skew.x for {kx}");
                assert!((d.skew.y - ky).abs() < 1e-5, "skew.y for {ky}");
            }
        }
    }

    #[test]
    fn rotate_quarter_turn() {
        let mut m = Matrix::IDENTITY;
        m.rotate(core::f64::consts::FRAC_PI_2);
        let p = m.apply(Point::new(1.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn copy_from_replaces_components() {
        let mut src = Matrix::IDENTITY;
        src.set_transform(1.0, 2.0, 0.0, 0.0, 3.0, 4.0, 0.5, 0.0, 0.0);
        let mut dst = Matrix::IDENTITY;
        dst.copy_from(&src);
        assert_eq!(dst.to_array(), src.to_array());
        assert!(dst.require_update);
    }
}
