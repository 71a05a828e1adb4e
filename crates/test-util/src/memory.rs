// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! In-memory [`RsvpStore`] used to test the service and the HTTP layer without postgres
use database::{DatabaseError, Result};
use db_storage::rsvps::{NewRsvp, Rsvp, RsvpStatus, RsvpStore};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryRsvpStore {
    rsvps: Mutex<BTreeMap<String, Rsvp>>,
    unavailable: AtomicBool,
}

impl MemoryRsvpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already contains the given rsvps
    pub fn with_rsvps<I>(rsvps: I) -> Self
    where
        I: IntoIterator<Item = NewRsvp>,
    {
        let store = Self::new();

        {
            let mut map = store.rsvps.lock();
            for rsvp in rsvps {
                map.insert(rsvp.id.clone(), into_rsvp(rsvp));
            }
        }

        store
    }

    /// Let every following store operation fail like a lost database connection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Number of stored rsvps, bypassing the availability flag
    pub fn len(&self) -> usize {
        self.rsvps.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(DatabaseError::R2D2Error(
                "memory store marked unavailable".into(),
            ));
        }

        Ok(())
    }
}

fn into_rsvp(new: NewRsvp) -> Rsvp {
    Rsvp {
        id: new.id,
        name: new.name,
        email: new.email,
        status: new.status,
    }
}

impl RsvpStore for MemoryRsvpStore {
    fn get(&self, id: &str) -> Result<Option<Rsvp>> {
        self.check_available()?;

        Ok(self.rsvps.lock().get(id).cloned())
    }

    fn put(&self, rsvp: NewRsvp) -> Result<Rsvp> {
        self.check_available()?;

        let rsvp = into_rsvp(rsvp);
        self.rsvps.lock().insert(rsvp.id.clone(), rsvp.clone());

        Ok(rsvp)
    }

    fn put_all(&self, rsvps: Vec<NewRsvp>) -> Result<Vec<Rsvp>> {
        self.check_available()?;

        // Holding the lock for the whole batch mirrors the transaction of the postgres store
        let mut map = self.rsvps.lock();

        Ok(rsvps
            .into_iter()
            .map(|rsvp| {
                let rsvp = into_rsvp(rsvp);
                map.insert(rsvp.id.clone(), rsvp.clone());
                rsvp
            })
            .collect())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.check_available()?;

        Ok(self.rsvps.lock().remove(id).is_some())
    }

    fn list_all(&self) -> Result<Vec<Rsvp>> {
        self.check_available()?;

        Ok(self.rsvps.lock().values().cloned().collect())
    }

    fn filter_by_status(&self, status: RsvpStatus) -> Result<Vec<Rsvp>> {
        self.check_available()?;

        Ok(self
            .rsvps
            .lock()
            .values()
            .filter(|rsvp| rsvp.status == status)
            .cloned()
            .collect())
    }

    fn count_all(&self) -> Result<i64> {
        self.check_available()?;

        Ok(self.rsvps.lock().len() as i64)
    }

    fn count_by_status(&self, status: RsvpStatus) -> Result<i64> {
        self.check_available()?;

        Ok(self
            .rsvps
            .lock()
            .values()
            .filter(|rsvp| rsvp.status == status)
            .count() as i64)
    }
}
