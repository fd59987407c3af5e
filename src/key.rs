//! Lock key derivation.
//!
//! Every counter the crate touches lives under the `lock:` namespace. The
//! default identity of a call is `"<name>(<first positional argument>)"`,
//! mirroring how the wrapped callable would read at its call site.

/// Namespace prefix applied to every lock counter key.
pub const LOCK_KEY_PREFIX: &str = "lock:";

/// Apply the lock namespace to a raw key.
pub fn lock_key(key: &str) -> String {
    format!("{}{}", LOCK_KEY_PREFIX, key)
}

/// Render the default call identity: `"<name>(<first positional argument>)"`.
pub fn call_key<A: KeySource>(name: &str, args: &A) -> String {
    format!("{}({})", name, args.key_fragment())
}

/// The portion of a call's arguments that identifies its unit of work.
///
/// For tuples this is the first element's fragment; remaining elements are
/// carried to the callable but take no part in the key. Types without a
/// sensible text form can skip this trait entirely by installing a custom
/// key function on the policy wrapper.
pub trait KeySource {
    /// Text form of the identifying argument.
    fn key_fragment(&self) -> String;
}

impl<T: KeySource + ?Sized> KeySource for &T {
    fn key_fragment(&self) -> String {
        (**self).key_fragment()
    }
}

impl KeySource for () {
    fn key_fragment(&self) -> String {
        String::new()
    }
}

macro_rules! impl_key_source_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeySource for $ty {
                fn key_fragment(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_key_source_display!(
    String, str, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

macro_rules! impl_key_source_tuple {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: KeySource $(, $rest)*> KeySource for ($first, $($rest,)*) {
            fn key_fragment(&self) -> String {
                self.0.key_fragment()
            }
        }
    };
}

impl_key_source_tuple!(A);
impl_key_source_tuple!(A, B);
impl_key_source_tuple!(A, B, C);
impl_key_source_tuple!(A, B, C, D);
impl_key_source_tuple!(A, B, C, D, E);
