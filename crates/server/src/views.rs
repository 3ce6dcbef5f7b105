use askama::Template;
use contacts_archiver::{ArchiveSnapshot, ArchiveStatus};
use contacts_store::Contact;

/// What the archive widget needs from an [`ArchiveSnapshot`].
pub struct ArchiveView {
    pub status: &'static str,
    pub percentage: String,
    pub running: bool,
    pub complete: bool,
}

impl From<ArchiveSnapshot> for ArchiveView {
    fn from(snapshot: ArchiveSnapshot) -> Self {
        Self {
            status: snapshot.status.as_str(),
            percentage: format!("{:.0}", snapshot.progress_percentage()),
            running: snapshot.status == ArchiveStatus::Running,
            complete: snapshot.status == ArchiveStatus::Complete,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub flashes: Vec<String>,
    pub contacts: &'a [Contact],
    pub query: &'a str,
    pub next_page: Option<usize>,
    pub archive: ArchiveView,
}

#[derive(Template)]
#[template(path = "rows.html")]
pub struct RowsFragment<'a> {
    pub contacts: &'a [Contact],
    pub next_page: Option<usize>,
}

#[derive(Template)]
#[template(path = "archive_ui.html")]
pub struct ArchiveFragment {
    pub archive: ArchiveView,
}

#[derive(Template)]
#[template(path = "new.html")]
pub struct NewContactPage<'a> {
    pub flashes: Vec<String>,
    pub contact: &'a Contact,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditContactPage<'a> {
    pub flashes: Vec<String>,
    pub contact: &'a Contact,
}

#[derive(Template)]
#[template(path = "show.html")]
pub struct ShowContactPage<'a> {
    pub flashes: Vec<String>,
    pub contact: &'a Contact,
}
