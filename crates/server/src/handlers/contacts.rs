use crate::flash::{session_cookie, session_from_headers, FlashStore};
use crate::http_api::{found, render, with_cookie, HttpError, HttpResult};
use crate::state::AppState;
use crate::views::{EditContactPage, IndexPage, NewContactPage, RowsFragment, ShowContactPage};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Form,
};
use contacts_store::{Contact, PAGE_SIZE};
use serde::Deserialize;
use std::sync::Arc;

const HX_TRIGGER: &str = "hx-trigger";
const SEARCH_TRIGGER: &str = "search";
const SAVE_ERROR_FIELD: &str = "save";

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    q: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl ContactForm {
    /// All four fields must be present; empty values are left to store validation.
    fn into_fields(self) -> HttpResult<(String, String, String, String)> {
        fn required(value: Option<String>, name: &str) -> HttpResult<String> {
            value.ok_or_else(|| HttpError::bad_request(format!("bad request: missing field {name}")))
        }
        Ok((
            required(self.first_name, "first_name")?,
            required(self.last_name, "last_name")?,
            required(self.phone, "phone")?,
            required(self.email, "email")?,
        ))
    }
}

fn parse_page(raw: Option<&str>) -> HttpResult<usize> {
    let Some(raw) = raw else {
        return Ok(1);
    };
    raw.trim()
        .parse::<usize>()
        .map_err(|_| HttpError::bad_request(format!("Invalid page number: {raw}")))
}

fn parse_contact_id(raw: &str) -> HttpResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| HttpError::bad_request(format!("Invalid contact id: {raw}")))
}

fn drain_flashes(state: &AppState, headers: &HeaderMap) -> Vec<String> {
    session_from_headers(headers)
        .map(|session| state.flashes.take(&session))
        .unwrap_or_default()
}

/// Queue `message` for the session, minting a session (and its cookie) if needed.
fn flash(state: &AppState, headers: &HeaderMap, message: &str) -> Option<String> {
    if let Some(session) = session_from_headers(headers) {
        state.flashes.push(&session, message);
        return None;
    }
    let Some(session) = FlashStore::new_session_id() else {
        log::error!("Could not allocate a session id, dropping flash message: {message}");
        return None;
    };
    state.flashes.push(&session, message);
    Some(session_cookie(&session))
}

pub async fn index() -> HttpResult {
    found("/contacts")
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> HttpResult {
    let page = parse_page(params.page.as_deref())?;
    let search = params.q.unwrap_or_default();
    log::info!("contacts query page={page} search={search:?}");

    let (contacts, next_page) = {
        let store = state.store.lock().await;
        if search.is_empty() {
            let contacts = store.page(page)?;
            let next_page = (store.count() > page.saturating_mul(PAGE_SIZE)).then_some(page + 1);
            (contacts, next_page)
        } else {
            (store.search(&search), None)
        }
    };

    let from_search_box = headers
        .get(HX_TRIGGER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == SEARCH_TRIGGER);
    if !search.is_empty() && from_search_box {
        let rows = RowsFragment {
            contacts: &contacts,
            next_page,
        };
        return Ok(render(&rows)?.into_response());
    }

    let view = IndexPage {
        flashes: drain_flashes(&state, &headers),
        contacts: &contacts,
        query: &search,
        next_page,
        archive: state.archiver.snapshot().into(),
    };
    Ok(render(&view)?.into_response())
}

pub async fn count(State(state): State<Arc<AppState>>) -> String {
    let count = state.store.lock().await.count();
    format!("({count} total Contacts)")
}

pub async fn new_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> HttpResult {
    let contact = Contact::default();
    let view = NewContactPage {
        flashes: drain_flashes(&state, &headers),
        contact: &contact,
    };
    Ok(render(&view)?.into_response())
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ContactForm>,
) -> HttpResult {
    let (first, last, phone, email) = form.into_fields()?;
    let mut contact = Contact::new(first, last, phone, email);

    let saved = state.store.lock().await.save(&mut contact).await;
    match saved {
        Ok(true) => {
            log::info!("Created contact {}", contact.id);
            let cookie = flash(&state, &headers, "Created New Contact!");
            with_cookie(found("/contacts")?, cookie)
        }
        Ok(false) => {
            let view = NewContactPage {
                flashes: Vec::new(),
                contact: &contact,
            };
            Ok(render(&view)?.into_response())
        }
        Err(err) => {
            log::error!("Error saving contact: {err}");
            contact.errors.insert(
                SAVE_ERROR_FIELD.to_string(),
                format!("error saving contact: {err}"),
            );
            let view = NewContactPage {
                flashes: Vec::new(),
                contact: &contact,
            };
            Ok((StatusCode::INTERNAL_SERVER_ERROR, render(&view)?).into_response())
        }
    }
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HttpResult {
    let id = parse_contact_id(&raw_id)?;
    let contact = state
        .store
        .lock()
        .await
        .find(id)
        .map_err(|_| HttpError::not_found(format!("Contact not found: {raw_id}")))?;

    let view = ShowContactPage {
        flashes: drain_flashes(&state, &headers),
        contact: &contact,
    };
    Ok(render(&view)?.into_response())
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HttpResult {
    let id = parse_contact_id(&raw_id)?;
    let contact = state
        .store
        .lock()
        .await
        .find(id)
        .map_err(|_| HttpError::not_found(format!("Contact not found: {raw_id}")))?;

    let view = EditContactPage {
        flashes: drain_flashes(&state, &headers),
        contact: &contact,
    };
    Ok(render(&view)?.into_response())
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    Form(form): Form<ContactForm>,
) -> HttpResult {
    let id = parse_contact_id(&raw_id)?;
    let (first, last, phone, email) = form.into_fields()?;

    let saved = {
        let mut store = state.store.lock().await;
        let mut contact = store
            .find(id)
            .map_err(|_| HttpError::not_found(format!("Contact not found: {raw_id}")))?;
        contact.first = first;
        contact.last = last;
        contact.phone = phone;
        contact.email = email;
        let result = store.save(&mut contact).await;
        (contact, result)
    };

    match saved {
        (contact, Ok(true)) => {
            log::info!("Updated contact {}", contact.id);
            let cookie = flash(&state, &headers, "Updated Contact!");
            with_cookie(found(&format!("/contacts/{}", contact.id))?, cookie)
        }
        (contact, Ok(false)) => {
            let view = EditContactPage {
                flashes: Vec::new(),
                contact: &contact,
            };
            Ok(render(&view)?.into_response())
        }
        (mut contact, Err(err)) => {
            log::error!("Error saving contact {id}: {err}");
            contact.errors.insert(
                SAVE_ERROR_FIELD.to_string(),
                format!("error saving contact: {err}"),
            );
            let view = EditContactPage {
                flashes: Vec::new(),
                contact: &contact,
            };
            Ok((StatusCode::INTERNAL_SERVER_ERROR, render(&view)?).into_response())
        }
    }
}

async fn remove(state: &AppState, headers: &HeaderMap, raw_id: &str) -> HttpResult<Option<String>> {
    let id = parse_contact_id(raw_id)?;
    let removed = state.store.lock().await.delete(id).await?;
    log::info!("Deleted contact {} <{}>", removed.id, removed.email);
    Ok(flash(state, headers, "Deleted Contact!"))
}

/// `POST /contacts/:id/delete`, for plain HTML forms.
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HttpResult {
    let cookie = remove(&state, &headers, &raw_id).await?;
    with_cookie(found("/contacts")?, cookie)
}

/// `DELETE /contacts/:id`; answers 303 so the follow-up request is a GET.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HttpResult {
    let cookie = remove(&state, &headers, &raw_id).await?;
    with_cookie(Redirect::to("/contacts").into_response(), cookie)
}
