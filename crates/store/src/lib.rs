//! # Contacts Store
//!
//! In-memory address book persisted as a single JSON file.
//!
//! ## Features
//!
//! - **Validation** with per-field messages (email required and unique)
//! - **Stable identifiers** from a monotonic counter, never reused after a delete
//! - **Deterministic ordering** by identifier for listing, search and the file itself
//! - **Atomic persistence** via write-to-temp and rename, rolled back in memory on failure
//!
//! ## Example
//!
//! ```no_run
//! use contacts_store::{Contact, ContactStore};
//!
//! #[tokio::main]
//! async fn main() -> contacts_store::Result<()> {
//!     let mut store = ContactStore::open("contacts.json").await?;
//!
//!     let mut contact = Contact::new("Ada", "Lovelace", "555-0100", "ada@example.com");
//!     if !store.save(&mut contact).await? {
//!         println!("invalid: {:?}", contact.errors);
//!     }
//!
//!     for c in store.page(1)? {
//!         println!("{} {} <{}>", c.first, c.last, c.email);
//!     }
//!     Ok(())
//! }
//! ```

mod contact;
mod error;
mod store;

pub use contact::{Contact, EMAIL_FIELD};
pub use error::{Result, StoreError};
pub use store::{ContactStore, DEFAULT_DB_FILE_NAME, PAGE_SIZE};
