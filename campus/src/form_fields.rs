/// Create an enum of form fields that can be iterated over with
/// tab/shift-tab. Each field gets a label and says whether its input should be
/// masked.
#[macro_export]
macro_rules! form_fields {
    ($name:ident { $($variant:ident($label:literal, $masked:literal)),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(
                #[doc = $label]
                $variant
            ),*
        }

        impl $crate::app::form::Field for $name {
            const FIELDS: &'static [$name] = &[
                $($name::$variant),*
            ];

            fn index(self) -> usize {
                self as usize
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),*
                }
            }

            fn masked(self) -> bool {
                match self {
                    $(Self::$variant => $masked),*
                }
            }
        }
    };
}
