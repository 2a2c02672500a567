use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

/// 2D point in device-independent units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D affine transform using the row-vector convention.
///
/// A point maps as `(x, y) -> (x*m11 + y*m21 + dx, x*m12 + y*m22 + dy)`, so
/// `a * b` applies `a` first and `b` second.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Matrix3x2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Matrix3x2 {
    pub const IDENTITY: Self = Self { m11: 1.0, m12: 0.0, m21: 0.0, m22: 1.0, dx: 0.0, dy: 0.0 };

    #[inline]
    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self { m11: 1.0, m12: 0.0, m21: 0.0, m22: 1.0, dx, dy }
    }

    /// Clockwise rotation (in a +Y-down space) by `quarter_turns * 90` degrees.
    ///
    /// Only right angles are supported; the entries are exact, with no
    /// trigonometric rounding.
    pub const fn quarter_turns(quarter_turns: u32) -> Self {
        let (cos, sin) = match quarter_turns % 4 {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        };
        Self { m11: cos, m12: sin, m21: -sin, m22: cos, dx: 0.0, dy: 0.0 }
    }

    #[inline]
    pub fn transform_point(&self, p: Point2) -> Point2 {
        Point2::new(
            p.x * self.m11 + p.y * self.m21 + self.dx,
            p.x * self.m12 + p.y * self.m22 + self.dy,
        )
    }
}

impl Default for Matrix3x2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix3x2 {
    type Output = Matrix3x2;

    fn mul(self, rhs: Matrix3x2) -> Matrix3x2 {
        Matrix3x2 {
            m11: self.m11 * rhs.m11 + self.m12 * rhs.m21,
            m12: self.m11 * rhs.m12 + self.m12 * rhs.m22,
            m21: self.m21 * rhs.m11 + self.m22 * rhs.m21,
            m22: self.m21 * rhs.m12 + self.m22 * rhs.m22,
            dx: self.dx * rhs.m11 + self.dy * rhs.m21 + rhs.dx,
            dy: self.dx * rhs.m12 + self.dy * rhs.m22 + rhs.dy,
        }
    }
}

/// Row-major 4x4 matrix, laid out for direct upload into a uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Matrix4x4 {
    pub rows: [[f32; 4]; 4],
}

impl Matrix4x4 {
    /// 0 degree Z rotation.
    pub const ROTATION_0: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// 90 degree Z rotation.
    pub const ROTATION_90: Self = Self {
        rows: [
            [0.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// 180 degree Z rotation.
    pub const ROTATION_180: Self = Self {
        rows: [
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, -1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// 270 degree Z rotation.
    pub const ROTATION_270: Self = Self {
        rows: [
            [0.0, -1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Raw bytes for `Queue::write_buffer`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::ROTATION_0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_maps_x_axis_onto_y_axis() {
        let p = Matrix3x2::quarter_turns(1).transform_point(Point2::new(1.0, 0.0));
        assert_eq!(p, Point2::new(0.0, 1.0));
    }

    #[test]
    fn rotate_then_translate_applies_left_operand_first() {
        let m = Matrix3x2::quarter_turns(1) * Matrix3x2::translation(600.0, 0.0);
        // (x, y) -> (-y, x) -> (600 - y, x)
        assert_eq!(m.transform_point(Point2::new(10.0, 20.0)), Point2::new(580.0, 10.0));
        assert_eq!(m.dx, 600.0);
        assert_eq!(m.dy, 0.0);
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let q = Matrix3x2::quarter_turns(1);
        assert_eq!(q * q * q * q, Matrix3x2::IDENTITY);
    }

    #[test]
    fn rotation_matrices_are_inverse_pairs() {
        let a = Matrix4x4::ROTATION_90.rows;
        let b = Matrix4x4::ROTATION_270.rows;
        for (i, row) in a.iter().enumerate() {
            for j in 0..4 {
                let v: f32 = (0..4).map(|k| row[k] * b[k][j]).sum();
                assert_eq!(v, if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn matrix_bytes_are_row_major_f32() {
        let bytes = Matrix4x4::ROTATION_90.as_bytes();
        assert_eq!(bytes.len(), 64);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[..4], &[0.0, 1.0, 0.0, 0.0]);
    }
}
