/// Configuration macros for zero-repetition config definitions
///
/// The `config_struct!` macro defines a configuration structure with embedded
/// defaults in a single declaration: field name, type and default value in
/// one place. It generates the struct with public fields, the `Default`
/// implementation, and serde support with `#[serde(default)]`.
///
/// # Example
/// ```
/// use scorehub::config_struct;
///
/// config_struct! {
///     pub struct RateLimitConfig {
///         window_ms: u64 = 1000,
///         max_weight: u32 = 10,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
