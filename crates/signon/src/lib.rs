/* Copyright (C) 2024  AlphaKeks <alphakeks@dawn.sh>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this repository.  If not, see <https://www.gnu.org/licenses/>.
 */

//! A small web application that lets users sign in through Steam.
//!
//! Call [`run()`] with a [`Config`] to start the server.

#[macro_use]
extern crate derive_more;

use std::io;
use std::net::SocketAddr;

use axum::ServiceExt;
use steam_auth::{HttpClient, OptionsError};
use tower::ServiceBuilder;
use tower_http::ServiceBuilderExt;

pub mod config;
pub use config::Config;

pub mod runtime;

mod http_client;
pub use http_client::{HttpService, http_service};

mod middleware;
mod response;
mod routes;
pub use routes::{AppState, SteamStrategy, router};

mod session;
pub use session::{IntoSessionUser, SessionStore, User};

mod views;

#[derive(Debug, Display, Error)]
pub enum Error {
    #[display("invalid `steam-auth` configuration: {_0}")]
    ConfigureSteamAuth(OptionsError),

    #[display("failed to initialize runtime: {_0}")]
    InitializeRuntime(io::Error),

    #[display("failed to run server: {_0}")]
    RunServer(io::Error),
}

/// Run the server.
///
/// This function will initialize its own [`tokio`] runtime and **block** until the server shuts
/// down.
pub fn run(config: Config) -> Result<(), Error> {
    let strategy = SteamStrategy::new(
        config.steam_auth.strategy_options(),
        http_service(HttpClient::new()),
        IntoSessionUser,
    )
    .map_err(Error::ConfigureSteamAuth)?;

    runtime::build(&config.runtime)
        .map_err(Error::InitializeRuntime)?
        .block_on(async {
            let sessions = SessionStore::new(config.cookies.session_ttl());
            let state = AppState::new(strategy, sessions, config.cookies);

            let service = ServiceBuilder::new()
                .map_response_body(axum::body::Body::new)
                .set_x_request_id(middleware::request_id::make_request_id())
                .propagate_x_request_id()
                .layer(middleware::trace::layer())
                .layer(middleware::catch_panic::layer())
                .service(router(state).into_service())
                .into_make_service_with_connect_info::<SocketAddr>();

            let listener = tokio::net::TcpListener::bind(config.server.socket_addr())
                .await
                .map_err(Error::RunServer)?;

            let addr = listener.local_addr().map_err(Error::RunServer)?;

            tracing::info!("Listening on http://{addr}");

            axum::serve(listener, service)
                .with_graceful_shutdown(runtime::signal::shutdown())
                .await
                .map_err(Error::RunServer)
        })
}
