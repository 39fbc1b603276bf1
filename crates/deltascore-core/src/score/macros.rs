//! Declarative macros for score type boilerplate.
//!
//! A level-based score is a struct of `i64` fields, highest priority first.
//! The field list drives ordering, arithmetic and [`Score`](super::Score).

/// Implements ordering, `Add`/`Sub`/`Neg` and [`Score`](super::Score) for a
/// struct of `i64` levels.
///
/// `$ctor` must take the levels in the listed order. Levels compare
/// lexicographically, so the first field dominates. `Score::zero` is the
/// derived `Default`.
///
/// ```ignore
/// impl_level_score!(HardSoftScore { hard, soft } => of);
/// ```
macro_rules! impl_level_score {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                ( $(self.$field,)+ ).cmp(&( $(other.$field,)+ ))
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor( $(self.$field + other.$field),+ )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor( $(self.$field - other.$field),+ )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor( $(-self.$field),+ )
            }
        }

        impl $crate::score::traits::Score for $type {
            #[inline]
            fn zero() -> Self {
                Self::default()
            }

            fn multiply(&self, factor: i64) -> Self {
                $type::$ctor( $(self.$field * factor),+ )
            }
        }
    };
}

/// Implements [`ParseableScore`](super::ParseableScore) for the
/// `"<n>hard/<n>soft"` family of formats.
///
/// Each field maps to its suffix; the part count must match exactly.
macro_rules! impl_suffixed_parse {
    ($type:ident { $($field:ident => $suffix:literal),+ } => $ctor:ident) => {
        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                let s = s.trim();
                let mut parts = s.split('/');
                $(
                    let $field = $crate::score::traits::parse_suffixed(
                        stringify!($type),
                        s,
                        parts.next(),
                        $suffix,
                    )?;
                )+
                if parts.next().is_some() {
                    return Err($crate::score::traits::ScoreParseError {
                        message: format!("{} '{}' has too many levels", stringify!($type), s),
                    });
                }
                Ok($type::$ctor( $($field),+ ))
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }
    };
}
