//! Tagged result wrappers that keep absence and failure in the return type.
//!
//! [`Maybe`] is the present-or-absent value used for lookups and [`Outcome`]
//! is the failure-or-success value used by the validation pipeline. Both
//! are plain enums so callers match on them exhaustively, and both convert
//! to and from the standard `Option`/`Result` at the edges.
//!
//! ```rust
//! use taskboard_core::outcome::{Maybe, Outcome};
//!
//! let id = Maybe::Present(41).map(|n| n + 1);
//! assert_eq!(id.get_or_else(0), 42);
//!
//! let parsed: Outcome<String, i32> = Outcome::Success(2);
//! let halved = parsed.flat_map(|n| {
//!     if n % 2 == 0 {
//!         Outcome::Success(n / 2)
//!     } else {
//!         Outcome::Failure(format!("{n} is odd"))
//!     }
//! });
//! assert_eq!(halved, Outcome::Success(1));
//! ```

use serde::Serialize;

/// A value that may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Maybe<T> {
    Present(T),
    Absent,
}

impl<T> Maybe<T> {
    #[inline]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    #[inline]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Apply `f` to a present value; absent stays absent.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        match self {
            Self::Present(value) => Maybe::Present(f(value)),
            Self::Absent => Maybe::Absent,
        }
    }

    /// Monadic bind: chain a step that may itself produce nothing.
    #[inline]
    pub fn flat_map<U>(self, f: impl FnOnce(T) -> Maybe<U>) -> Maybe<U> {
        match self {
            Self::Present(value) => f(value),
            Self::Absent => Maybe::Absent,
        }
    }

    #[inline]
    pub fn get_or_else(self, default: T) -> T {
        match self {
            Self::Present(value) => value,
            Self::Absent => default,
        }
    }

    #[inline]
    pub const fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Present(value) => Maybe::Present(value),
            Self::Absent => Maybe::Absent,
        }
    }

    #[inline]
    pub fn into_option(self) -> Option<T> {
        self.into()
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(value: Maybe<T>) -> Self {
        match value {
            Maybe::Present(value) => Some(value),
            Maybe::Absent => None,
        }
    }
}

/// Either a failure payload `E` or a success payload `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome<E, T> {
    Failure(E),
    Success(T),
}

impl<E, T> Outcome<E, T> {
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[inline]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Transform the success payload; failures pass through untouched.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<E, U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Chain a dependent step, short-circuiting on the first failure.
    #[inline]
    pub fn flat_map<U>(self, f: impl FnOnce(T) -> Outcome<E, U>) -> Outcome<E, U> {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the failure payload; successes pass through untouched.
    #[inline]
    pub fn map_error<F>(self, f: impl FnOnce(E) -> F) -> Outcome<F, T> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    #[inline]
    pub fn get_or_else(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => default,
        }
    }

    #[inline]
    pub const fn as_ref(&self) -> Outcome<&E, &T> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// The success payload, discarding any failure.
    #[inline]
    pub fn success(self) -> Maybe<T> {
        match self {
            Self::Success(value) => Maybe::Present(value),
            Self::Failure(_) => Maybe::Absent,
        }
    }

    /// The failure payload, discarding any success.
    #[inline]
    pub fn failure(self) -> Maybe<E> {
        match self {
            Self::Failure(error) => Maybe::Present(error),
            Self::Success(_) => Maybe::Absent,
        }
    }

    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<E, T> From<Result<T, E>> for Outcome<E, T> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<E, T> From<Outcome<E, T>> for Result<T, E> {
    fn from(value: Outcome<E, T>) -> Self {
        match value {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}
