/* Copyright (C) 2024  AlphaKeks <alphakeks@dawn.sh>
 *
 * This library is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this repository.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Helper functions & types for using Steam as an OpenID 2.0 provider.
//!
//! Steam only supports the stateless ("dumb") mode of OpenID 2.0: there are no associations, so
//! every assertion is sent back to Steam with `openid.mode=check_authentication` and Steam answers
//! whether it issued it. The procedure looks like this:
//!
//! 1. redirect the user to [`login_url()`]
//! 2. the user logs in on Steam's website
//! 3. Steam redirects the user back to `return_to` with a [`CallbackPayload`] encoded in the query
//!    string
//! 4. an [`OpenIdVerifier`] checks the payload with Steam and yields the claimed identifier

/// Steam's OpenID 2.0 endpoint.
pub const LOGIN_URL: &str = "https://steamcommunity.com/openid/login";

/// The OpenID 2.0 namespace.
pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Prefix of every identity URL Steam asserts.
pub const IDENTITY_URL_PREFIX: &str = "https://steamcommunity.com/openid/id/";

pub mod client;

mod login_url;
pub use login_url::login_url;

mod callback_payload;
pub use callback_payload::CallbackPayload;

mod verifier;
pub use verifier::{OpenIdVerifier, StatelessVerifier, VerifyError};
