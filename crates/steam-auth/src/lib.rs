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

//! Steam as a sign-on provider.
//!
//! [`Strategy`] ties the pieces together: it builds the login redirect, verifies the assertion
//! Steam sends back, checks that the claimed identity really belongs to Steam, optionally fetches
//! the user's public profile from the Steam Web API, and finally hands everything to a
//! caller-supplied [`Validate`] callback.
//!
//! HTTP is performed through any `tower::Service<http::Request<Bytes>>`. With the (default)
//! `reqwest` feature enabled, [`HttpClient`] adapts a [`reqwest::Client`].

#[macro_use]
extern crate derive_more;

mod options;
pub use options::{OptionsError, StrategyOptions};

mod outcome;
pub use outcome::{Failure, Outcome};

pub mod identity;
pub use identity::{IdentityRejected, verify_identity};

mod profile;
pub use profile::{Photo, Profile};

pub mod web_api;
pub use web_api::{ProfileEnricher, ProfileError, ProfileErrorKind};

mod strategy;
pub use strategy::{AuthError, Authenticated, Strategy, Validate};

#[cfg(feature = "reqwest")]
mod http_client;

#[cfg(feature = "reqwest")]
pub use http_client::HttpClient;

pub use steam_id::{LegacySteamId, SteamId};
pub use steam_openid::client;
pub use steam_openid::{CallbackPayload, OpenIdVerifier, StatelessVerifier, VerifyError};
