use askama::Template;
use axum::response::Html;

use crate::response::ErrorResponse;
use crate::session::User;

#[derive(Debug, Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub user: Option<&'a User>,
}

#[derive(Debug, Template)]
#[template(path = "account.html")]
pub struct AccountTemplate<'a> {
    pub user: &'a User,

    /// The whole session user, pretty-printed.
    pub user_json: String,
}

pub fn render(template: &impl Template) -> Result<Html<String>, ErrorResponse> {
    template
        .render()
        .map(Html)
        .map_err(ErrorResponse::internal_server_error)
}
