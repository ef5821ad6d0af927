// SPDX-License-Identifier: MIT OR Apache-2.0

//! C-style enums modeled as integer newtypes.
//!
//! The secure side is free to send back values this crate has never heard
//! of. Storing such a value in a Rust enum would be undefined behavior, so
//! wire-level enumerations are newtypes with a set of associated constants
//! instead.

/// Define a newtype around an integer (or other `Copy` value) together with
/// a set of named constants and a `Debug` impl that prints the constant name
/// when the value is known.
///
/// ```ignore
/// newtype_enum! {
///     pub enum UnixBool: i32 => #[allow(missing_docs)] {
///         FALSE          =  0,
///         TRUE           =  1,
///         FILE_NOT_FOUND = -1,
///     }
/// }
/// ```
macro_rules! newtype_enum {
    (
        $(#[$type_attrs:meta])*
        $visibility:vis enum $type:ident : $base:ty => $(#[$impl_attrs:meta])* {
            $(
                $(#[$variant_attrs:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        $(#[$type_attrs])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Eq, PartialEq, Hash)]
        $visibility struct $type(pub $base);

        $(#[$impl_attrs])*
        #[allow(unused)]
        impl $type {
            $(
                $(#[$variant_attrs])*
                pub const $variant: $type = $type($value);
            )*
        }

        impl core::fmt::Debug for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    $(
                        $type::$variant => f.write_str(stringify!($variant)),
                    )*
                    $type(unknown) => {
                        write!(f, "{}({:#x?})", stringify!($type), unknown)
                    }
                }
            }
        }
    }
}
