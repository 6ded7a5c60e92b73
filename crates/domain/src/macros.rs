//! Declarative helpers shared by the domain modules.

/// Define a closed set of string-labelled variants.
///
/// Generates the enum with serde renames, `as_str`, `ALL`, `Display`, and a
/// `FromStr` that fails with [`UnknownLabel`](crate::error::UnknownLabel).
/// Writing `default Variant` after the name also implements [`Default`].
macro_rules! labelled_enum {
    (
        $(#[doc = $doc:expr])*
        $name:ident default $default:ident {
            $( $(#[doc = $vdoc:expr])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        labelled_enum! {
            $(#[doc = $doc])*
            $name {
                $( $(#[doc = $vdoc])* $variant => $label ),+
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
    (
        $(#[doc = $doc:expr])*
        $name:ident {
            $( $(#[doc = $vdoc:expr])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[doc = $vdoc])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire/storage label of the variant.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(crate::error::UnknownLabel {
                        kind: stringify!($name),
                        label: other.to_string(),
                    }),
                }
            }
        }
    };
}
