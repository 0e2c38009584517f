//! `define_port_error!` builds a port's thiserror enum plus one snake_case
//! constructor per variant, with `impl Into<T>` parameters for each field.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum ListingStoreError {
            Offline => "listing store offline",
            Rejected { reason: String } => "listing rejected: {reason}",
            Throttled { retry_after_secs: u64 } => "listing store throttled for {retry_after_secs}s",
            Partial { reason: String, written: usize } => "partial write ({written}): {reason}",
        }
    }

    #[test]
    fn unit_variants_get_snake_case_constructors() {
        assert_eq!(ListingStoreError::offline(), ListingStoreError::Offline);
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = ListingStoreError::rejected("duplicate");
        assert_eq!(err.to_string(), "listing rejected: duplicate");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(
            ListingStoreError::throttled(30_u64).to_string(),
            "listing store throttled for 30s"
        );
        assert_eq!(
            ListingStoreError::partial("disk full", 3_usize).to_string(),
            "partial write (3): disk full"
        );
    }
}
