use std::borrow::Cow;

/// How a single login attempt ended.
#[must_use]
#[derive(Debug)]
pub enum Outcome<T, E> {
    /// The user is authenticated.
    Success(T),

    /// The user could not be authenticated.
    ///
    /// This is the user's (or Steam's) fault, not ours; the host application should treat it like
    /// a wrong password.
    Failure(Failure),

    /// Something went wrong while trying to authenticate the user.
    Error(E),
}

impl<T, E> Outcome<T, E> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(failure) => Outcome::Failure(failure),
            Self::Error(error) => Outcome::Error(error),
        }
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(failure) => Outcome::Failure(failure),
            Self::Error(error) => Outcome::Error(f(error)),
        }
    }

    /// Splits the outcome into "did something break" and "did the user get in".
    pub fn into_result(self) -> Result<Result<T, Failure>, E> {
        match self {
            Self::Success(value) => Ok(Ok(value)),
            Self::Failure(failure) => Ok(Err(failure)),
            Self::Error(error) => Err(error),
        }
    }
}

impl<T, E> From<Failure> for Outcome<T, E> {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

/// A human-readable reason for a failed login.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{message}")]
pub struct Failure {
    message: Cow<'static, str>,
}

impl Failure {
    pub const INVALID_RESPONSE: Self = Self::new_static("Invalid OpenID response.");
    pub const CANCELED: Self = Self::new_static("OpenID authentication canceled.");
    pub const UNVERIFIED: Self = Self::new_static("Failed to verify assertion.");
    pub const INVALID_IDENTITY: Self = Self::new_static("Claimed identity is invalid.");

    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self { message: message.into() }
    }

    const fn new_static(message: &'static str) -> Self {
        Self { message: Cow::Borrowed(message) }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
