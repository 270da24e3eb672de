//!
//! String to numeric value parsing
//!
//! Thin wrapper over [`std::str::FromStr`] used by [`crate::parameters`].

pub(crate) trait FromStr: Sized {
    type Err;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>;
}

macro_rules! impl_from_str {
    ($($t:ty),*) => {
        $(
            impl FromStr for $t {
                type Err = <$t as std::str::FromStr>::Err;
                #[inline]
                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    <$t as std::str::FromStr>::from_str(s)
                }
            }
        )*
    };
}

impl_from_str!(f64, i32, bool);
