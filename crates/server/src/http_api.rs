use askama::Template;
use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use contacts_store::StoreError;

/// A failed request, rendered as a plain-text body with `status`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            return Self::not_found(err.to_string());
        }
        log::error!("Contact DB error: {err}");
        Self::internal(format!("error saving contact DB: {err}"))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub type HttpResult<T = Response> = Result<T, HttpError>;

pub(crate) fn render<T: Template>(template: &T) -> HttpResult<Html<String>> {
    template.render().map(Html).map_err(|err| {
        log::error!("Template render failed: {err}");
        HttpError::internal(format!("template error: {err}"))
    })
}

/// `302 Found` to `location`, the way the listing redirects after a form post.
pub(crate) fn found(location: &str) -> HttpResult {
    let location = HeaderValue::from_str(location)
        .map_err(|_| HttpError::internal(format!("invalid redirect target: {location}")))?;
    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(LOCATION, location);
    Ok(response)
}

pub(crate) fn with_cookie(mut response: Response, cookie: Option<String>) -> HttpResult {
    if let Some(cookie) = cookie {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|_| HttpError::internal("invalid session cookie"))?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}
