// SPDX-License-Identifier: MIT

/// Wires the `From` conversions between the layered error enums.
///
/// - `top`: each sub-error converts into the top-level variant
/// - `str_into`: `&'static str` converts into `Other` of each listed error (and of top)
/// - `sub`: inter-layer conversions (`Src => [Dst::Variant, ...]`)
#[macro_export]
macro_rules! fs_error_wiring {
    (
        top => $top:ident {
            $($top_src:ty : $top_variant:ident),+ $(,)?
        },
        str_into => [ $($str_tgt:ident),* $(,)? ],
        sub => {
            $($src_sub:ty => [ $($dst_sub:ident::$dst_variant:ident),+ ] ),* $(,)?
        } $(,)?
    ) => {
        $(
            impl From<$top_src> for $top {
                #[inline]
                fn from(e: $top_src) -> Self { $top::$top_variant(e) }
            }
        )+

        $crate::fs_error_wiring!(@str $top $(, $str_tgt)*);

        $($(
            impl From<$src_sub> for $dst_sub {
                #[inline]
                fn from(e: $src_sub) -> Self { $dst_sub::$dst_variant(e) }
            }
        )+)*
    };
    (@str $($t:ident),+) => {
        $(
            impl From<&'static str> for $t {
                #[inline]
                fn from(msg: &'static str) -> Self { $t::Other(msg) }
            }
        )+
    };
}

/// Returns early with `$err.into()` unless `$cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Returns early with `$err.into()`.
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}
