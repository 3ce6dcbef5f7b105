use crate::contact::{Contact, EMAIL_FIELD};
use crate::error::{Result, StoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const PAGE_SIZE: usize = 100;
pub const DEFAULT_DB_FILE_NAME: &str = "contacts.json";

/// Contacts keyed by identifier, persisted wholesale as a JSON array after every mutation.
pub struct ContactStore {
    contacts: BTreeMap<u64, Contact>,
    path: PathBuf,
    next_id: u64,
}

impl ContactStore {
    /// Empty store that will persist to `path`. Nothing is written until the first mutation.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            contacts: BTreeMap::new(),
            path: path.as_ref().to_path_buf(),
            next_id: 1,
        }
    }

    /// Load the store from `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self::new(path);
        if tokio::fs::try_exists(&store.path).await? {
            store.load().await?;
        } else {
            log::info!(
                "Contact DB {} does not exist yet, starting empty",
                store.path.display()
            );
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> usize {
        self.contacts.len()
    }

    /// Attach validation messages to `contact`; returns `true` when none were added.
    ///
    /// Any messages from a previous attempt are cleared first.
    pub fn validate(&self, contact: &mut Contact) -> bool {
        contact.errors.clear();
        if contact.email.is_empty() {
            contact
                .errors
                .insert(EMAIL_FIELD.to_string(), "Email is required".to_string());
        } else if self
            .contacts
            .values()
            .any(|other| other.id != contact.id && other.email == contact.email)
        {
            contact
                .errors
                .insert(EMAIL_FIELD.to_string(), "Email must be unique".to_string());
        }
        !contact.has_errors()
    }

    /// Validate and upsert `contact`, then persist the whole store.
    ///
    /// Returns `Ok(false)` without touching the store when validation fails; the
    /// messages are left on `contact.errors`. A new contact gets its id assigned in
    /// place. If the write fails, the in-memory state is rolled back.
    pub async fn save(&mut self, contact: &mut Contact) -> Result<bool> {
        if !self.validate(contact) {
            log::debug!("Contact {} failed validation: {:?}", contact.id, contact.errors);
            return Ok(false);
        }

        let prev_next_id = self.next_id;
        let assigned = contact.is_new();
        let id = if assigned { self.next_id } else { contact.id };
        let after = id.checked_add(1).ok_or(StoreError::InvalidId(id))?;
        contact.id = id;
        self.next_id = self.next_id.max(after);
        let previous = self.contacts.insert(id, contact.clone());

        if let Err(err) = self.persist().await {
            match previous {
                Some(old) => {
                    self.contacts.insert(id, old);
                }
                None => {
                    self.contacts.remove(&id);
                }
            }
            self.next_id = prev_next_id;
            if assigned {
                contact.id = 0;
            }
            return Err(err);
        }
        Ok(true)
    }

    /// Remove the contact with `id` and persist. The removed record is returned.
    pub async fn delete(&mut self, id: u64) -> Result<Contact> {
        let removed = self.contacts.remove(&id).ok_or(StoreError::NotFound(id))?;
        if let Err(err) = self.persist().await {
            self.contacts.insert(id, removed);
            return Err(err);
        }
        Ok(removed)
    }

    /// Replace the in-memory contents with the persisted file.
    pub async fn load(&mut self) -> Result<()> {
        log::info!("Loading contact DB from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        let records: Vec<Contact> = serde_json::from_slice(&data)?;

        // Id 0 means "unassigned"; a stored record must never carry it.
        if records.iter().any(Contact::is_new) {
            return Err(StoreError::InvalidId(0));
        }
        let contacts: BTreeMap<u64, Contact> = records.into_iter().map(|c| (c.id, c)).collect();
        self.next_id = match contacts.keys().next_back() {
            Some(max) => max.checked_add(1).ok_or(StoreError::InvalidId(*max))?,
            None => 1,
        };
        self.contacts = contacts;

        log::info!("Loaded {} contacts", self.contacts.len());
        Ok(())
    }

    pub fn find(&self, id: u64) -> Result<Contact> {
        self.contacts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Contacts whose first name, last name, email or phone contains `text`, by id.
    pub fn search(&self, text: &str) -> Vec<Contact> {
        self.contacts
            .values()
            .filter(|c| c.matches(text))
            .cloned()
            .collect()
    }

    /// One page of contacts ordered by id. Pages are 1-based and [`PAGE_SIZE`] long.
    pub fn page(&self, page: usize) -> Result<Vec<Contact>> {
        if page == 0 {
            return Err(StoreError::PageNotFound(page));
        }
        let start = (page - 1).saturating_mul(PAGE_SIZE);
        if start >= self.contacts.len() && !(page == 1 && self.contacts.is_empty()) {
            return Err(StoreError::PageNotFound(page));
        }
        Ok(self
            .contacts
            .values()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect())
    }

    async fn persist(&self) -> Result<()> {
        log::debug!(
            "Saving {} contacts to {}",
            self.contacts.len(),
            self.path.display()
        );
        let records: Vec<&Contact> = self.contacts.values().collect();
        let bytes = serde_json::to_vec_pretty(&records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn contact(n: u64) -> Contact {
        Contact::new(
            format!("First{n}"),
            format!("Last{n}"),
            format!("555-{n:04}"),
            format!("user{n}@example.com"),
        )
    }

    #[tokio::test]
    async fn empty_email_is_rejected_without_mutation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.json");
        let mut store = ContactStore::new(&path);

        let mut c = Contact::new("No", "Mail", "555", "");
        assert!(!store.save(&mut c).await.unwrap());
        assert_eq!(c.error(EMAIL_FIELD), "Email is required");
        assert_eq!(c.id, 0);
        assert_eq!(store.count(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = ContactStore::new(dir.path().join("contacts.json"));

        let mut first = contact(1);
        assert!(store.save(&mut first).await.unwrap());

        let mut second = Contact::new("Other", "Person", "555", first.email.clone());
        assert!(!store.save(&mut second).await.unwrap());
        assert_eq!(second.error(EMAIL_FIELD), "Email must be unique");
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn updating_keeps_own_email() {
        let dir = TempDir::new().unwrap();
        let mut store = ContactStore::new(dir.path().join("contacts.json"));

        let mut c = contact(1);
        store.save(&mut c).await.unwrap();
        c.phone = "555-9999".to_string();
        assert!(store.save(&mut c).await.unwrap());
        assert_eq!(store.count(), 1);
        assert_eq!(store.find(c.id).unwrap().phone, "555-9999");
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let dir = TempDir::new().unwrap();
        let mut store = ContactStore::new(dir.path().join("contacts.json"));

        let mut a = contact(1);
        let mut b = contact(2);
        store.save(&mut a).await.unwrap();
        store.save(&mut b).await.unwrap();
        store.delete(a.id).await.unwrap();

        let mut c = contact(3);
        store.save(&mut c).await.unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn failed_write_rolls_back_memory() {
        let dir = TempDir::new().unwrap();
        // A directory at the target path makes the rename fail.
        let path = dir.path().join("contacts.json");
        std::fs::create_dir(&path).unwrap();
        let mut store = ContactStore::new(&path);

        let mut c = contact(1);
        assert!(store.save(&mut c).await.is_err());
        assert_eq!(store.count(), 0);
        assert_eq!(c.id, 0);

        std::fs::remove_dir(&path).unwrap();
        assert!(store.save(&mut c).await.unwrap());
        assert_eq!(c.id, 1);
    }

    #[tokio::test]
    async fn update_with_top_id_is_rejected_without_mutation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.json");
        let mut store = ContactStore::new(&path);

        let mut c = contact(1);
        c.id = u64::MAX;
        assert!(matches!(
            store.save(&mut c).await,
            Err(StoreError::InvalidId(id)) if id == u64::MAX
        ));
        assert_eq!(store.count(), 0);
        assert!(!path.exists());

        let mut next = contact(2);
        assert!(store.save(&mut next).await.unwrap());
        assert_eq!(next.id, 1);
    }

    #[test]
    fn empty_store_has_empty_first_page() {
        let store = ContactStore::new("unused.json");
        assert!(store.page(1).unwrap().is_empty());
        assert!(matches!(store.page(0), Err(StoreError::PageNotFound(0))));
        assert!(matches!(store.page(2), Err(StoreError::PageNotFound(2))));
    }
}
