use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{CoreError, CoreResult};

/// Element type of a [`Vector`].
pub trait Scalar:
    Copy
    + PartialEq
    + Default
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// Widen to `f64` for norms and comparisons.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, truncating for integer types.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_scalar {
    ($($t:ty => $zero:expr, $one:expr);* $(;)?) => {
        $(
            impl Scalar for $t {
                const ZERO: Self = $zero;
                const ONE: Self = $one;

                fn to_f64(self) -> f64 {
                    f64::from(self)
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_scalar! {
    f32 => 0.0, 1.0;
    i32 => 0, 1;
    u32 => 0, 1;
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Scalar for i64 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as i64
    }
}

/// Fixed-size numeric vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<T: Scalar, const N: usize>([T; N]);

/// Two `f32`s.
pub type Vec2f = Vector<f32, 2>;
/// Three `f32`s.
pub type Vec3f = Vector<f32, 3>;
/// Four `f32`s.
pub type Vec4f = Vector<f32, 4>;
/// Two `f64`s.
pub type Vec2d = Vector<f64, 2>;
/// Three `f64`s.
pub type Vec3d = Vector<f64, 3>;
/// Four `f64`s.
pub type Vec4d = Vector<f64, 4>;
/// Two `i32`s.
pub type Vec2i = Vector<i32, 2>;
/// Three `i32`s.
pub type Vec3i = Vector<i32, 3>;
/// Four `i32`s.
pub type Vec4i = Vector<i32, 4>;

impl<T: Scalar, const N: usize> Vector<T, N> {
    /// Build from an array.
    pub const fn new(values: [T; N]) -> Self {
        Self(values)
    }

    /// Every element set to `value`.
    pub fn splat(value: T) -> Self {
        Self([value; N])
    }

    /// Build from a slice, which must hold exactly `N` elements.
    pub fn try_from_slice(values: &[T]) -> CoreResult<Self> {
        let array: [T; N] = values.try_into().map_err(|_| CoreError::VectorLength {
            expected: N,
            actual: values.len(),
        })?;
        Ok(Self(array))
    }

    /// The all-zero vector.
    pub fn zero() -> Self {
        Self::splat(T::ZERO)
    }

    /// The unit vector along axis `axis`; all zero if `axis >= N`.
    pub fn unit(axis: usize) -> Self {
        let mut v = Self::zero();
        if let Some(slot) = v.0.get_mut(axis) {
            *slot = T::ONE;
        }
        v
    }

    /// Dimension.
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the vector has zero dimensions.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Checked element access.
    pub fn at(&self, index: usize) -> CoreResult<T> {
        self.0
            .get(index)
            .copied()
            .ok_or(CoreError::IndexOutOfRange { index, len: N })
    }

    /// Checked element write.
    pub fn set(&mut self, index: usize, value: T) -> CoreResult<()> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len: N })?;
        *slot = value;
        Ok(())
    }

    /// The elements as an array.
    pub fn as_array(&self) -> &[T; N] {
        &self.0
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> T {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(T::ZERO, |acc, (a, b)| acc + *a * *b)
    }

    /// Squared Euclidean length.
    pub fn length_squared(&self) -> T {
        self.dot(self)
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.length_squared().to_f64().sqrt()
    }

    /// This vector scaled to unit length. A zero vector is returned as is.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        Self(self.0.map(|v| T::from_f64(v.to_f64() / len)))
    }

    /// Scale to unit length in place.
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Component-wise comparison with tolerance `epsilon`.
    pub fn almost_equal(&self, other: &Self, epsilon: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a.to_f64() - b.to_f64()).abs() <= epsilon)
    }
}

impl<T: Scalar> Vector<T, 2> {
    /// First element.
    pub fn x(&self) -> T {
        self.0[0]
    }
    /// Second element.
    pub fn y(&self) -> T {
        self.0[1]
    }
}

impl<T: Scalar> Vector<T, 3> {
    /// First element.
    pub fn x(&self) -> T {
        self.0[0]
    }
    /// Second element.
    pub fn y(&self) -> T {
        self.0[1]
    }
    /// Third element.
    pub fn z(&self) -> T {
        self.0[2]
    }
}

impl<T: Scalar> Vector<T, 4> {
    /// First element.
    pub fn x(&self) -> T {
        self.0[0]
    }
    /// Second element.
    pub fn y(&self) -> T {
        self.0[1]
    }
    /// Third element.
    pub fn z(&self) -> T {
        self.0[2]
    }
    /// Fourth element.
    pub fn w(&self) -> T {
        self.0[3]
    }
}

impl<T: Scalar, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(values: [T; N]) -> Self {
        Self(values)
    }
}

impl<T: Scalar, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T: Scalar, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<T: Scalar, const N: usize> AddAssign for Vector<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl<T: Scalar, const N: usize> SubAssign for Vector<T, N> {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
    }
}

impl<T: Scalar, const N: usize> MulAssign<T> for Vector<T, N> {
    fn mul_assign(&mut self, rhs: T) {
        for a in &mut self.0 {
            *a *= rhs;
        }
    }
}

impl<T: Scalar, const N: usize> DivAssign<T> for Vector<T, N> {
    fn div_assign(&mut self, rhs: T) {
        for a in &mut self.0 {
            *a /= rhs;
        }
    }
}

impl<T: Scalar, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<T: Scalar, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<T: Scalar, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;

    fn mul(mut self, rhs: T) -> Self {
        self *= rhs;
        self
    }
}

impl<T: Scalar, const N: usize> Div<T> for Vector<T, N> {
    type Output = Self;

    fn div(mut self, rhs: T) -> Self {
        self /= rhs;
        self
    }
}

impl<T: Scalar + Neg<Output = T>, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|v| -v))
    }
}

macro_rules! impl_scalar_lhs_mul {
    ($($t:ty),*) => {
        $(
            impl<const N: usize> Mul<Vector<$t, N>> for $t {
                type Output = Vector<$t, N>;

                fn mul(self, rhs: Vector<$t, N>) -> Vector<$t, N> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_lhs_mul!(f32, f64, i32, i64, u32);

impl<T: Scalar, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector{N}(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}
