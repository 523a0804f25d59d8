//! Bounds on the values a map can store.

/// A value that can live in a map's value array.
///
/// Values are plain data: they are copied in and out of the table, compared
/// against the map's default return value, and `V::default()` fills slots that
/// hold no entry. Every primitive type qualifies.
pub trait Value: Copy + Default + PartialEq {}

impl<T> Value for T where T: Copy + Default + PartialEq {}

/// A value that supports the accumulating operations
/// [`add_to`](crate::HashMap::add_to) and
/// [`sub_from`](crate::HashMap::sub_from).
///
/// Integer arithmetic wraps on overflow.
pub trait Numeric: Value + PartialOrd {
    /// The additive identity.
    const ZERO: Self;

    /// Returns `self + rhs`.
    fn add_value(self, rhs: Self) -> Self;

    /// Returns `self - rhs`.
    fn sub_value(self, rhs: Self) -> Self;
}

macro_rules! impl_numeric_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Numeric for $t {
                const ZERO: Self = 0;

                #[inline]
                fn add_value(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                #[inline]
                fn sub_value(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
            }
        )*
    };
}

macro_rules! impl_numeric_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl Numeric for $t {
                const ZERO: Self = 0.0;

                #[inline]
                fn add_value(self, rhs: Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn sub_value(self, rhs: Self) -> Self {
                    self - rhs
                }
            }
        )*
    };
}

impl_numeric_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_numeric_float!(f32, f64);
