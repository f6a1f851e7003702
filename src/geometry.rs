//! Geometry primitives shared by meshes, slices and transforms

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::error::Error;

/// A point (or vector) in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
}

impl Point3D {
    /// Create a new point
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Cross product
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Dot product
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector with the same direction; the zero vector maps to itself
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > f32::EPSILON {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            Self::default()
        }
    }
}

impl Add for Point3D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A point in the plane of a slice
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point2D {
    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Affine transform stored as a row-major 4x4 matrix
///
/// The last column is always `(0, 0, 0, 1)`. Points are row vectors, so a
/// point `p` maps to `p * M` and the translation lives in the last row.
/// The 3MF text form lists the first three columns of each row:
/// `m00 m01 m02 m10 m11 m12 m20 m21 m22 m30 m31 m32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix(pub [f32; 16]);

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// The identity transform
    pub const fn identity() -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// A pure translation
    pub const fn translation(x: f32, y: f32, z: f32) -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0,
        ])
    }

    /// Build from the twelve 3MF values
    pub fn from_values(v: [f32; 12]) -> Self {
        Self([
            v[0], v[1], v[2], 0.0, //
            v[3], v[4], v[5], 0.0, //
            v[6], v[7], v[8], 0.0, //
            v[9], v[10], v[11], 1.0,
        ])
    }

    /// The twelve 3MF values, in document order
    pub fn values(&self) -> [f32; 12] {
        let m = &self.0;
        [
            m[0], m[1], m[2], m[4], m[5], m[6], m[8], m[9], m[10], m[12], m[13], m[14],
        ]
    }

    /// Element at `row`, `col`
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.0[row * 4 + col]
    }

    /// Returns true for the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Returns true if the transform keeps the XY plane horizontal and Z unscaled
    pub fn is_planar(&self) -> bool {
        self.at(0, 2) == 0.0
            && self.at(1, 2) == 0.0
            && self.at(2, 0) == 0.0
            && self.at(2, 1) == 0.0
            && self.at(2, 2) == 1.0
    }

    /// Apply the transform to a point
    pub fn mul_point(&self, p: Point3D) -> Point3D {
        Point3D::new(
            p.x * self.at(0, 0) + p.y * self.at(1, 0) + p.z * self.at(2, 0) + self.at(3, 0),
            p.x * self.at(0, 1) + p.y * self.at(1, 1) + p.z * self.at(2, 1) + self.at(3, 1),
            p.x * self.at(0, 2) + p.y * self.at(1, 2) + p.z * self.at(2, 2) + self.at(3, 2),
        )
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    /// `self` applied first, then `rhs`
    fn mul(self, rhs: Matrix) -> Matrix {
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = (0..4).map(|k| self.at(row, k) * rhs.at(k, col)).sum();
            }
        }
        Matrix(out)
    }
}

impl FromStr for Matrix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = [0.0f32; 12];
        let mut count = 0;
        for token in s.split_whitespace() {
            if count == 12 {
                return Err(Error::InvalidFormat(format!(
                    "transform has more than 12 values: '{}'",
                    s
                )));
            }
            values[count] = token
                .parse::<f32>()
                .map_err(|e| Error::InvalidFormat(format!("transform value '{}': {}", token, e)))?;
            count += 1;
        }
        if count != 12 {
            return Err(Error::InvalidFormat(format!(
                "transform needs 12 values, got {}",
                count
            )));
        }
        Ok(Matrix::from_values(values))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.values().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_and_dot() {
        let x = Point3D::new(1.0, 0.0, 0.0);
        let y = Point3D::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Point3D::new(0.0, 0.0, 1.0));
        assert_eq!(x.dot(y), 0.0);
        assert_eq!(Point3D::new(3.0, 0.0, 4.0).length(), 5.0);
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(Point3D::default().normalize(), Point3D::default());
        let n = Point3D::new(0.0, 0.0, 2.0).normalize();
        assert_eq!(n, Point3D::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_matrix_parse_and_display() {
        let m: Matrix = "1 0 0 0 1 0 0 0 1 10 20 30".parse().unwrap();
        assert_eq!(m, Matrix::translation(10.0, 20.0, 30.0));
        assert_eq!(m.to_string(), "1 0 0 0 1 0 0 0 1 10 20 30");
        assert!(m.is_planar());
        assert!(!m.is_identity());
    }

    #[test]
    fn test_matrix_parse_rejects_wrong_count() {
        assert!("1 0 0".parse::<Matrix>().is_err());
        assert!("1 0 0 0 1 0 0 0 1 0 0 0 5".parse::<Matrix>().is_err());
        assert!("1 0 0 0 1 0 0 0 a 0 0 0".parse::<Matrix>().is_err());
    }

    #[test]
    fn test_matrix_mul_point() {
        let m = Matrix::translation(1.0, 2.0, 3.0);
        assert_eq!(m.mul_point(Point3D::new(1.0, 1.0, 1.0)), Point3D::new(2.0, 3.0, 4.0));
        let combined = m * Matrix::translation(1.0, 0.0, 0.0);
        assert_eq!(combined, Matrix::translation(2.0, 2.0, 3.0));
    }

    #[test]
    fn test_non_planar_rotation() {
        // 90 degrees about the X axis moves Z into Y
        let m = Matrix::from_values([1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(!m.is_planar());
    }
}
