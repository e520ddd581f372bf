/// Presence check behind a field's `has_value` flag.
///
/// A value "has value" when there is something to show: strings must be
/// non-empty, optional values must be present, numbers always count.
pub trait FieldValue {
    /// Whether the value counts as filled in.
    fn has_value(&self) -> bool;
}

impl FieldValue for String {
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

impl FieldValue for &'static str {
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn has_value(&self) -> bool {
        self.as_ref().is_some_and(FieldValue::has_value)
    }
}

impl<T> FieldValue for Vec<T> {
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

macro_rules! always_has_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn has_value(&self) -> bool {
                    true
                }
            }
        )*
    };
}

always_has_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);
