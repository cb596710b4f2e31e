//! In-memory content stores
//!
//! One [`EntityStore`] per content type, each loaded from the content API at
//! most once per lifetime (unless explicitly refreshed) and patched in place
//! from backend responses afterwards. Every mutation is a single write-lock
//! critical section and publishes a [`CmsEvent`] on the shared bus.
//!
//! The store never talks to the backend itself; callers hold
//! [`EntityStore::load_guard`] while fetching so concurrent first requests
//! share one fetch.

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

use crate::entities::{
    Article, Collection, Entity, EntityKind, NhsCondition, NhsMedicine, Pack, Quiz, Reference,
    Section, SubSection, Tip,
};
use crate::events::{CmsEvent, EventBus};
use crate::journey::{Journey, UnitValues};
use crate::validation::ValidationErrors;
use crate::{EntityId, Error, NodeId, Result};

struct Inner<T> {
    items: Vec<T>,
    loaded: bool,
}

/// Cached collection of one entity type
pub struct EntityStore<T> {
    inner: RwLock<Inner<T>>,
    load_guard: Mutex<()>,
    bus: EventBus,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: Vec::new(),
                loaded: false,
            }),
            load_guard: Mutex::new(()),
            bus,
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.inner.read().await.loaded
    }

    /// Serialize loads: hold the guard, re-check [`is_loaded`](Self::is_loaded),
    /// then fetch
    pub async fn load_guard(&self) -> MutexGuard<'_, ()> {
        self.load_guard.lock().await
    }

    /// Replace the whole collection and mark it loaded
    pub async fn replace_all(&self, items: Vec<T>) {
        let count = items.len();
        {
            let mut inner = self.inner.write().await;
            inner.items = items;
            inner.loaded = true;
        }
        debug!(kind = %T::KIND, count, "Store loaded");
        self.bus.emit_lossy(CmsEvent::EntitiesLoaded {
            kind: T::KIND,
            count,
            timestamp: Utc::now(),
        });
    }

    /// Snapshot of every item in backend order
    pub async fn all(&self) -> Vec<T> {
        self.inner.read().await.items.clone()
    }

    pub async fn get(&self, id: EntityId) -> Option<T> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub async fn contains(&self, id: EntityId) -> bool {
        self.inner.read().await.items.iter().any(|item| item.id() == id)
    }

    /// Replace the item with the same id, or append it
    pub async fn upsert(&self, item: T) {
        let id = item.id();
        {
            let mut inner = self.inner.write().await;
            match inner.items.iter_mut().find(|existing| existing.id() == id) {
                Some(existing) => *existing = item,
                None => inner.items.push(item),
            }
        }
        self.bus.emit_lossy(CmsEvent::EntityUpserted {
            kind: T::KIND,
            id,
            timestamp: Utc::now(),
        });
    }

    pub async fn remove(&self, id: EntityId) -> Option<T> {
        let removed = {
            let mut inner = self.inner.write().await;
            let index = inner.items.iter().position(|item| item.id() == id)?;
            inner.items.remove(index)
        };
        self.bus.emit_lossy(CmsEvent::EntityDeleted {
            kind: T::KIND,
            id,
            timestamp: Utc::now(),
        });
        Some(removed)
    }

    /// Edit one item in place
    ///
    /// `f` runs against a copy; the copy replaces the stored item only when
    /// `f` succeeds, so a failed edit never leaves a partial change behind.
    /// Returns the updated item together with `f`'s result.
    pub async fn try_modify<R, F>(&self, id: EntityId, f: F) -> Result<(T, R)>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let (updated, output) = {
            let mut inner = self.inner.write().await;
            let slot = inner
                .items
                .iter_mut()
                .find(|item| item.id() == id)
                .ok_or_else(|| Error::NotFound(format!("{} {}", T::KIND, id)))?;
            let mut working = slot.clone();
            let output = f(&mut working)?;
            *slot = working.clone();
            (working, output)
        };

        let event = if T::KIND == EntityKind::Journey {
            CmsEvent::JourneyChanged {
                journey_id: id,
                timestamp: Utc::now(),
            }
        } else {
            CmsEvent::EntityUpserted {
                kind: T::KIND,
                id,
                timestamp: Utc::now(),
            }
        };
        self.bus.emit_lossy(event);
        Ok((updated, output))
    }
}

/// Every content store behind one handle
pub struct ContentStore {
    pub articles: EntityStore<Article>,
    pub collections: EntityStore<Collection>,
    pub sections: EntityStore<Section>,
    pub sub_sections: EntityStore<SubSection>,
    pub tips: EntityStore<Tip>,
    pub quizzes: EntityStore<Quiz>,
    pub packs: EntityStore<Pack>,
    pub conditions: EntityStore<NhsCondition>,
    pub medicines: EntityStore<NhsMedicine>,
    pub journeys: EntityStore<Journey>,
    bus: EventBus,
}

impl ContentStore {
    pub fn new(bus: EventBus) -> Self {
        Self {
            articles: EntityStore::new(bus.clone()),
            collections: EntityStore::new(bus.clone()),
            sections: EntityStore::new(bus.clone()),
            sub_sections: EntityStore::new(bus.clone()),
            tips: EntityStore::new(bus.clone()),
            quizzes: EntityStore::new(bus.clone()),
            packs: EntityStore::new(bus.clone()),
            conditions: EntityStore::new(bus.clone()),
            medicines: EntityStore::new(bus.clone()),
            journeys: EntityStore::new(bus.clone()),
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Typed store for `T`
    pub fn of<T: Entity>(&self) -> &EntityStore<T> {
        T::select(self)
    }

    /// `Some(true/false)` if the store for `kind` is loaded, `None` otherwise
    async fn lookup(&self, kind: EntityKind, id: EntityId) -> Option<bool> {
        async fn probe<T: Entity>(store: &EntityStore<T>, id: EntityId) -> Option<bool> {
            if store.is_loaded().await {
                Some(store.contains(id).await)
            } else {
                None
            }
        }

        match kind {
            EntityKind::Article => probe(&self.articles, id).await,
            EntityKind::Collection => probe(&self.collections, id).await,
            EntityKind::Section => probe(&self.sections, id).await,
            EntityKind::SubSection => probe(&self.sub_sections, id).await,
            EntityKind::Tip => probe(&self.tips, id).await,
            EntityKind::Quiz => probe(&self.quizzes, id).await,
            EntityKind::Pack => probe(&self.packs, id).await,
            EntityKind::Condition => probe(&self.conditions, id).await,
            EntityKind::Medicine => probe(&self.medicines, id).await,
            EntityKind::Journey => probe(&self.journeys, id).await,
        }
    }

    /// Flag foreign keys pointing at entities missing from a loaded store
    ///
    /// References into stores that were never loaded are not checked; the
    /// backend remains the authority for those.
    pub async fn check_references(&self, references: &[Reference]) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for reference in references {
            if self.lookup(reference.kind, reference.id).await == Some(false) {
                errors.push(
                    reference.field.clone(),
                    format!("Unknown {} {}", reference.kind, reference.id),
                );
            }
        }
        errors
    }

    /// Append a unit to a section of a stored journey
    ///
    /// A missing journey or section leaves every store untouched.
    pub async fn add_unit(
        &self,
        journey_id: EntityId,
        section_id: &NodeId,
        values: UnitValues,
    ) -> Result<NodeId> {
        let (_, unit_id) = self
            .journeys
            .try_modify(journey_id, |journey| journey.add_unit(section_id, values))
            .await?;
        Ok(unit_id)
    }
}
