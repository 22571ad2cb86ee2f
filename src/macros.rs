//! Macros to reduce boilerplate in the codebase

/// Generate `Display` and `FromStr` for a fieldless enum from a variant/text table.
///
/// Parsing is case-insensitive; the texts themselves must be lower case.
///
/// # Usage
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     MyEnum,
///     "my enum",
///     {
///         Variant1 => "variant1",
///         Variant2 => "variant 2",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $label:expr,
        { $($variant:ident => $str:literal),+ $(,)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::ConsoleError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok($enum_name::$variant),)+
                    _ => Err($crate::error::ConsoleError::InvalidChoice {
                        kind: $label,
                        value: s.to_string(),
                        expected: &[$($str),+],
                    }),
                }
            }
        }
    };
}

/// Run `$body` with `$entity` bound to the concrete entity type for a
/// [`ResourceKind`](crate::entities::ResourceKind).
///
/// # Usage
///
/// ```rust,ignore
/// with_entity!(kind, E => list_resource::<E>(&client, &args).await)
/// ```
#[macro_export]
macro_rules! with_entity {
    ($kind:expr, $entity:ident => $body:expr) => {{
        use $crate::entities::ResourceKind;
        match $kind {
            ResourceKind::Users => {
                type $entity = $crate::entities::User;
                $body
            }
            ResourceKind::Categories => {
                type $entity = $crate::entities::Category;
                $body
            }
            ResourceKind::Products => {
                type $entity = $crate::entities::Product;
                $body
            }
            ResourceKind::Trainings => {
                type $entity = $crate::entities::Training;
                $body
            }
            ResourceKind::Packages => {
                type $entity = $crate::entities::Package;
                $body
            }
            ResourceKind::Sales => {
                type $entity = $crate::entities::Sale;
                $body
            }
            ResourceKind::Commissions => {
                type $entity = $crate::entities::Commission;
                $body
            }
            ResourceKind::WalletTransactions => {
                type $entity = $crate::entities::WalletTransaction;
                $body
            }
            ResourceKind::CommissionConfigurations => {
                type $entity = $crate::entities::CommissionConfiguration;
                $body
            }
            ResourceKind::UnilevelConfigurations => {
                type $entity = $crate::entities::UnilevelConfiguration;
                $body
            }
            ResourceKind::TreeSettings => {
                type $entity = $crate::entities::TreeSetting;
                $body
            }
            ResourceKind::MlmSettings => {
                type $entity = $crate::entities::MlmSetting;
                $body
            }
            ResourceKind::Configurations => {
                type $entity = $crate::entities::Configuration;
                $body
            }
        }
    }};
}
