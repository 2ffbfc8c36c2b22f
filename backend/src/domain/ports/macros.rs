//! Macros shared by port definitions.

/// Define a port error enum with struct variants and snake_case constructors.
///
/// Each variant carries named fields and a `thiserror` display message that
/// may interpolate those fields. A constructor accepting `impl Into<T>` per
/// field is generated for every variant, so call sites can pass `&str` where
/// the variant stores `String`.
macro_rules! define_port_error {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $( $field:ident : $field_ty:ty ),* $(,)? } => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, ::thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $( $field : $field_ty ),* },
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = "Construct [`" $name "::" $variant "`]."]
                    pub fn [<$variant:snake>]( $( $field : impl ::core::convert::Into<$field_ty> ),* ) -> Self {
                        Self::$variant { $( $field : $field.into() ),* }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Error used only by this test.
        SampleError {
            Connection { message: String } => "connection failed: {message}",
            Saturated {} => "no capacity left",
        }
    }

    #[test]
    fn constructors_accept_into_types() {
        let err = SampleError::connection("refused");
        assert_eq!(
            err,
            SampleError::Connection {
                message: "refused".to_owned()
            }
        );
    }

    #[test]
    fn display_interpolates_fields() {
        assert_eq!(
            SampleError::connection("refused").to_string(),
            "connection failed: refused"
        );
        assert_eq!(SampleError::saturated().to_string(), "no capacity left");
    }
}
