//! 2D affine position matrix.

/// Row-major 2x3 affine transform: `p' = M * (x, y, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub m: [[f32; 3]; 2],
}

impl Affine2 {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    };

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0]],
        }
    }

    /// Counter-clockwise rotation about the z axis, in degrees.
    pub fn rotation_deg(angle: f32) -> Self {
        let (s, c) = angle.to_radians().sin_cos();
        Self {
            m: [[c, -s, 0.0], [s, c, 0.0]],
        }
    }

    /// `self * rhs`: `rhs` is applied first.
    pub fn concat(&self, rhs: &Self) -> Self {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [[0.0f32; 3]; 2];
        for (row, out_row) in out.iter_mut().enumerate() {
            out_row[0] = a[row][0] * b[0][0] + a[row][1] * b[1][0];
            out_row[1] = a[row][0] * b[0][1] + a[row][1] * b[1][1];
            out_row[2] = a[row][0] * b[0][2] + a[row][1] * b[1][2] + a[row][2];
        }
        Self { m: out }
    }

    /// Add a translation after the existing transform.
    pub fn translate(&mut self, x: f32, y: f32) {
        self.m[0][2] += x;
        self.m[1][2] += y;
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.m;
        (
            m[0][0] * x + m[0][1] * y + m[0][2],
            m[1][0] * x + m[1][1] * y + m[1][2],
        )
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
