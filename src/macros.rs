/// Implements the Default trait for a named type with a `Self::new()` function.
#[macro_export]
macro_rules! impl_default {
    ($name:ident) => {
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// Implements the [CommandOps](crate::CommandOps) trait for a host-initiated
/// message type with a fixed payload.
///
/// The type is expected to carry an `equipment` field naming the equipment
/// class the message addresses.
#[macro_export]
macro_rules! impl_command_ops {
    ($name:ident, $command:expr, $payload:expr) => {
        impl $crate::CommandOps for $name {
            fn equipment(&self) -> $crate::Equipment {
                self.equipment
            }

            fn command(&self) -> $crate::Command {
                $command
            }

            fn payload(&self) -> $crate::Result<Vec<u8>> {
                Ok($payload.to_vec())
            }
        }
    };
}

/// Provides convenience functions to deconstruct an enum with new-type variants.
#[macro_export]
macro_rules! inner_enum {
    // macro variant for when the enum variant and its type are the same ident
    ($ty:ident, $var:ident) => {
        inner_enum!($ty, $var, $var);
    };

    // macro variant for when the enum variant and its type are potentially different
    ($ty:ident, $var:ident, $var_ty:ident) => {
        impl $ty {
            ::paste::paste! {
                #[doc = "Gets whether `" $ty "` is the variant `" $var "`."]
                pub fn [<is_ $var:snake>](&self) -> bool {
                    matches!(self, $ty::$var(_))
                }

                #[doc = "Gets a reference to `" $ty "` as the variant `" $var "`'s inner type `" $var_ty "`."]
                pub fn [<as_ $var:snake>](&self) -> $crate::Result<&$var_ty> {
                    use $crate::Error;

                    match self {
                        $ty::$var(ty) => Ok(ty),
                        _ => Err(Error::failure(format!("have variant: {self}, expected: {}", std::any::type_name::<$var_ty>()))),
                    }
                }

                #[doc = "Converts `" $ty "` into the variant `" $var "`'s inner type `" $var_ty "`."]
                pub fn [<into_ $var:snake>](self) -> $crate::Result<$var_ty> {
                    use $crate::Error;

                    match self {
                        $ty::$var(ty) => Ok(ty),
                        _ => Err(Error::failure(format!("have variant: {self}, expected: {}", std::any::type_name::<$var_ty>()))),
                    }
                }
            }
        }
    };
}
