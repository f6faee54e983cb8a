use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::models::{
    Announcement, CourseData, CourseDetails, Deadline, NewAnnouncementRequest,
    NewDeadlineRequest, sort_by_due_date,
};
use crate::services::id::generate_id;
use crate::services::seed::default_course_data;
use crate::storage::{Storage, StorageError};

/// An immutable view of the course data at one commit.
pub type Snapshot = Arc<CourseData>;

type Callback = Arc<dyn Fn(&Snapshot) + Send + Sync>;
type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Commits waiting to be published, in commit order. At most one thread
/// delivers at a time; the others only enqueue.
#[derive(Default)]
struct Outbox {
    pending: VecDeque<Snapshot>,
    delivering: bool,
}

/// Clears `delivering` if a subscriber panics mid-delivery.
struct DeliveryGuard<'a>(&'a Mutex<Outbox>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).delivering = false;
    }
}

/// The single owner of the course data.
///
/// Each mutation builds a new [`CourseData`], swaps it in, writes it to
/// storage and then calls every subscriber with the new snapshot. Mutations
/// are serialized by the state lock, so storage sees writes in call order.
///
/// Snapshots are queued for publication while the state lock is held and
/// delivered strictly in commit order, one subscriber call at a time. If a
/// delivery is already running (on another thread, or because a subscriber
/// mutated the store from its callback) the mutation only enqueues and the
/// running delivery publishes it next. A subscriber's latest call therefore
/// always carries the latest commit it has been told about.
pub struct CourseStore {
    state: Mutex<Snapshot>,
    storage: Arc<dyn Storage>,
    subscribers: Arc<Mutex<Subscribers>>,
    outbox: Mutex<Outbox>,
    today: Clock,
}

impl CourseStore {
    /// Loads the saved document, or starts from the default content when
    /// nothing usable is stored.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let data = initial_data(storage.as_ref());
        Self::with_data(storage, data)
    }

    /// Starts from `data` without reading storage.
    pub fn with_data(storage: Arc<dyn Storage>, data: CourseData) -> Self {
        Self {
            state: Mutex::new(Arc::new(data)),
            storage,
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            outbox: Mutex::new(Outbox::default()),
            today: Box::new(|| Utc::now().date_naive()),
        }
    }

    /// Replaces the source of "today" used to date new announcements.
    pub fn with_clock<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Box::new(today);
        self
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock_state().clone()
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Registers `callback` to run after every commit. The callback stays
    /// registered until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut subscribers = self.lock_subscribers();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(callback)));

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().entries.len()
    }

    pub fn set_course_details(&self, details: CourseDetails) -> Result<Snapshot, AppError> {
        self.commit("set_course_details", |data| {
            data.course_details = details;
        })
    }

    /// Dates the announcement today and puts it first.
    pub fn add_announcement(&self, req: NewAnnouncementRequest) -> Result<Snapshot, AppError> {
        let announcement = Announcement {
            id: generate_id(),
            title: req.title,
            content: req.content,
            date: self.today().to_string(),
            important: req.important,
        };
        info!("adding announcement {} ({})", announcement.id, announcement.title);

        self.commit("add_announcement", |data| {
            data.announcements.insert(0, announcement);
        })
    }

    /// Replaces the announcement with the same id where it stands. Unknown
    /// ids leave the list as it is.
    pub fn update_announcement(&self, announcement: Announcement) -> Result<Snapshot, AppError> {
        self.commit("update_announcement", |data| {
            match data.announcements.iter_mut().find(|a| a.id == announcement.id) {
                Some(slot) => *slot = announcement,
                None => debug!("no announcement with id {}", announcement.id),
            }
        })
    }

    pub fn delete_announcement(&self, id: &str) -> Result<Snapshot, AppError> {
        self.commit("delete_announcement", |data| {
            data.announcements.retain(|a| a.id != id);
        })
    }

    pub fn add_deadline(&self, req: NewDeadlineRequest) -> Result<Snapshot, AppError> {
        let deadline = Deadline {
            id: generate_id(),
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            completed: None,
        };
        info!("adding deadline {} due {}", deadline.id, deadline.due_date);

        self.commit("add_deadline", |data| {
            data.deadlines.push(deadline);
            sort_by_due_date(&mut data.deadlines);
        })
    }

    pub fn update_deadline(&self, deadline: Deadline) -> Result<Snapshot, AppError> {
        self.commit("update_deadline", |data| {
            match data.deadlines.iter_mut().find(|d| d.id == deadline.id) {
                Some(slot) => *slot = deadline,
                None => debug!("no deadline with id {}", deadline.id),
            }
            sort_by_due_date(&mut data.deadlines);
        })
    }

    pub fn delete_deadline(&self, id: &str) -> Result<Snapshot, AppError> {
        self.commit("delete_deadline", |data| {
            data.deadlines.retain(|d| d.id != id);
        })
    }

    /// Applies `change` to a copy of the current data and makes the result
    /// current. The new state stays committed and subscribers are notified
    /// even when the write to storage fails; the failure is returned.
    fn commit<F>(&self, operation: &'static str, change: F) -> Result<Snapshot, AppError>
    where
        F: FnOnce(&mut CourseData),
    {
        let (snapshot, persisted) = {
            let mut current = self.lock_state();
            let mut next = CourseData::clone(&current);
            change(&mut next);

            let snapshot = Arc::new(next);
            *current = snapshot.clone();
            let persisted = self.persist(&snapshot);
            self.lock_outbox().pending.push_back(snapshot.clone());
            (snapshot, persisted)
        };
        debug!("{} committed", operation);

        self.publish();

        match persisted {
            Ok(()) => Ok(snapshot),
            Err(e) => {
                error!("{} applied but not saved: {}", operation, e);
                Err(AppError::Storage(e))
            }
        }
    }

    fn persist(&self, data: &CourseData) -> Result<(), StorageError> {
        let blob = serde_json::to_string(data)?;
        self.storage.write(&blob)
    }

    /// Delivers queued snapshots until the outbox is empty, unless another
    /// delivery is already running.
    fn publish(&self) {
        {
            let mut outbox = self.lock_outbox();
            if outbox.delivering {
                return;
            }
            outbox.delivering = true;
        }
        let guard = DeliveryGuard(&self.outbox);

        loop {
            // Emptiness check and release happen under one lock, so a
            // concurrent enqueue is never left behind.
            let next = {
                let mut outbox = self.lock_outbox();
                let next = outbox.pending.pop_front();
                if next.is_none() {
                    outbox.delivering = false;
                }
                next
            };
            let Some(snapshot) = next else {
                std::mem::forget(guard);
                return;
            };

            let callbacks: Vec<Callback> = self
                .lock_subscribers()
                .entries
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect();

            for callback in callbacks {
                callback(&snapshot);
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn initial_data(storage: &dyn Storage) -> CourseData {
    match storage.read() {
        Ok(Some(blob)) => match serde_json::from_str::<CourseData>(&blob) {
            Ok(data) => {
                info!(
                    "loaded course data ({} announcements, {} deadlines)",
                    data.announcements.len(),
                    data.deadlines.len()
                );
                data
            }
            Err(e) => {
                warn!("stored course data is malformed, using defaults: {}", e);
                default_course_data()
            }
        },
        Ok(None) => {
            info!("no stored course data, using defaults");
            default_course_data()
        }
        Err(e) => {
            warn!("failed to read stored course data, using defaults: {}", e);
            default_course_data()
        }
    }
}

/// Keeps a subscriber registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}
