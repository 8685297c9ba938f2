#![allow(dead_code)]

use pagenote_core::{
    Block, Document, NewPage, PageId, PageRecord, PageStorage, PageUpdate, SavePayload,
    StorageError,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Network,
    Server,
}

/// In-memory page backend with switchable failures.
#[derive(Default)]
pub struct MockStorage {
    pages: RefCell<HashMap<PageId, PageRecord>>,
    pub updates: RefCell<Vec<PageUpdate>>,
    pub deletes: Cell<usize>,
    pub failure: Cell<Option<Failure>>,
    pub unreachable: Cell<bool>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: PageRecord) {
        self.pages.borrow_mut().insert(record.id, record);
    }

    pub fn page(&self, id: PageId) -> Option<PageRecord> {
        self.pages.borrow().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn last_update_title(&self) -> Option<String> {
        self.updates.borrow().last().map(|update| update.title.clone())
    }

    fn check(&self) -> Result<(), StorageError> {
        match self.failure.get() {
            Some(Failure::Network) => Err(StorageError::Network("connection reset".into())),
            Some(Failure::Server) => Err(StorageError::Server("quota exceeded".into())),
            None => Ok(()),
        }
    }
}

impl PageStorage for MockStorage {
    fn create_page(&self, page: &NewPage) -> Result<PageId, StorageError> {
        self.check()?;
        let id = Uuid::new_v4();
        self.insert(PageRecord {
            id,
            title: page.title.clone(),
            content: page.content.clone(),
            snapshot: page.snapshot.clone(),
            preview_text: page.preview_text.clone(),
            preview_image: page.preview_image.clone(),
            attachments: Vec::new(),
            tags: Vec::new(),
            created_at: 0,
            updated_at: 0,
        });
        Ok(id)
    }

    fn get_page(&self, id: PageId) -> Result<PageRecord, StorageError> {
        self.check()?;
        self.page(id).ok_or(StorageError::NotFound(id))
    }

    fn update_page(&self, update: &PageUpdate) -> Result<(), StorageError> {
        self.check()?;
        self.updates.borrow_mut().push(update.clone());
        if let Some(record) = self.pages.borrow_mut().get_mut(&update.id) {
            record.title = update.title.clone();
            record.content = update.content.clone();
            record.snapshot = Some(update.snapshot.clone());
            record.tags = update.tags.clone();
        }
        Ok(())
    }

    fn delete_page(&self, id: PageId) -> Result<(), StorageError> {
        self.check()?;
        self.deletes.set(self.deletes.get() + 1);
        self.pages.borrow_mut().remove(&id);
        Ok(())
    }

    fn probe(&self) -> Result<(), StorageError> {
        if self.unreachable.get() {
            return Err(StorageError::Network("unreachable".into()));
        }
        Ok(())
    }
}

pub fn titled(title: &str) -> Document {
    Document::from_blocks(vec![Block::heading(1, title)])
}

pub fn payload(title: &str) -> SavePayload {
    SavePayload::from_document(&titled(title))
}

pub fn stored_page(id: PageId, doc: &Document) -> PageRecord {
    let payload = SavePayload::from_document(doc);
    PageRecord {
        id,
        title: payload.title,
        content: payload.content,
        snapshot: Some(payload.snapshot),
        preview_text: payload.preview_text,
        preview_image: payload.preview_image,
        attachments: Vec::new(),
        tags: vec!["kept".into()],
        created_at: 0,
        updated_at: 0,
    }
}
