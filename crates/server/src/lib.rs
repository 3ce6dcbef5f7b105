//! # Contacts Server
//!
//! Server-rendered contact manager: list, search and paginate contacts, create,
//! edit and delete them, and run a simulated archive export whose progress the
//! page polls.
//!
//! ## Routes
//!
//! ```text
//! GET    /                      -> 302 /contacts
//! GET    /contacts?q=&page=     listing (rows fragment for HX-Trigger: search)
//! GET    /contacts/count        "(N total Contacts)"
//! GET    /contacts/new          creation form
//! POST   /contacts/new          create, flash, 302 /contacts
//! POST   /contacts/archive      start the archiver
//! GET    /contacts/archive      poll the archiver
//! DELETE /contacts/archive      reset the archiver
//! GET    /contacts/archive/file download the contact DB
//! GET    /contacts/:id          show
//! GET    /contacts/:id/edit     edit form
//! POST   /contacts/:id/edit     update, flash, 302 /contacts/:id
//! POST   /contacts/:id/delete   delete, flash, 302 /contacts
//! DELETE /contacts/:id          delete, flash, 303 /contacts
//! GET    /static/*path          files under --static-dir
//! ```

mod bind;
pub mod config;
pub mod flash;
mod handlers;
pub mod http_api;
pub mod state;
mod views;

use anyhow::{Context as AnyhowContext, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use config::ServeArgs;
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    use handlers::{archive, assets, contacts};

    Router::new()
        .route("/", get(contacts::index))
        .route("/contacts", get(contacts::list))
        .route("/contacts/count", get(contacts::count))
        .route("/contacts/new", get(contacts::new_form).post(contacts::create))
        .route(
            "/contacts/archive",
            get(archive::status)
                .post(archive::start)
                .delete(archive::reset),
        )
        .route("/contacts/archive/file", get(archive::download))
        .route(
            "/contacts/:contact_id",
            get(contacts::show).delete(contacts::delete),
        )
        .route(
            "/contacts/:contact_id/edit",
            get(contacts::edit_form).post(contacts::update),
        )
        .route("/contacts/:contact_id/delete", post(contacts::delete_form))
        .route("/static/*path", get(assets::serve))
        .with_state(state)
}

/// Load the contact DB and serve until Ctrl-C.
pub async fn serve(args: ServeArgs) -> Result<()> {
    let addr = bind::resolve_bind_addr(&args.bind, args.public).await?;
    let state = AppState::open(&args)
        .await
        .with_context(|| format!("error loading contacts DB {}", args.db.display()))?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("Serving contacts on http://{}/contacts", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C, serving until killed: {err}");
        std::future::pending::<()>().await;
    }
}
