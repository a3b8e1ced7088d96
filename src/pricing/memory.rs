//! In-memory [`RoomStore`] used by tests and local tooling.
//!
//! A single mutex guards the whole state, which gives every operation the same
//! all-or-nothing behaviour the Postgres store gets from transactions.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::calendar::nights;
use crate::error::AppError;

use super::calculators::sort_by_precedence;
use super::models::{AvailabilityDay, NewPeakSeasonRate, PeakSeasonRate, Room, WeekendPeakRule};
use super::store::RoomStore;

#[derive(Debug, Default)]
struct State {
    rooms: HashMap<Uuid, Room>,
    calendars: HashMap<Uuid, BTreeMap<NaiveDate, bool>>,
    peak_rates: HashMap<Uuid, Vec<PeakSeasonRate>>,
}

impl State {
    fn active_room_mut(&mut self, room_id: Uuid) -> Option<&mut Room> {
        self.rooms.get_mut(&room_id).filter(|room| room.is_active())
    }

    fn is_active(&self, room_id: Uuid) -> bool {
        self.rooms.get(&room_id).is_some_and(Room::is_active)
    }
}

#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    state: Mutex<State>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a room.
    pub async fn put_room(&self, room: Room) {
        self.state.lock().await.rooms.insert(room.id, room);
    }

    /// Seed peak rates without going through replace.
    pub async fn put_peak_rate(&self, rate: PeakSeasonRate) {
        let mut state = self.state.lock().await;
        let rates = state.peak_rates.entry(rate.room_id).or_default();
        rates.push(rate);
        sort_by_precedence(rates);
    }

    /// Number of stored calendar rows for a room.
    pub async fn calendar_len(&self, room_id: Uuid) -> usize {
        self.state
            .lock()
            .await
            .calendars
            .get(&room_id)
            .map_or(0, BTreeMap::len)
    }
}

fn rows(room_id: Uuid, days: impl Iterator<Item = (NaiveDate, bool)>) -> Vec<AvailabilityDay> {
    days.map(|(date, is_available)| AvailabilityDay {
        room_id,
        date,
        is_available,
    })
    .collect()
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn find_room_by_id(&self, room_id: Uuid) -> Result<Option<Room>, AppError> {
        let state = self.state.lock().await;
        Ok(state.rooms.get(&room_id).filter(|room| room.is_active()).cloned())
    }

    async fn find_peak_rates_for_room(
        &self,
        room_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<PeakSeasonRate>, AppError> {
        let state = self.state.lock().await;
        let rates = state.peak_rates.get(&room_id).map(Vec::as_slice).unwrap_or_default();
        Ok(rates
            .iter()
            .filter(|rate| match range {
                Some((from, to)) => rate.end_date >= from && rate.start_date <= to,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn find_availability_days(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AvailabilityDay>, AppError> {
        let state = self.state.lock().await;
        Ok(match state.calendars.get(&room_id) {
            Some(calendar) if from < until => {
                rows(room_id, calendar.range(from..until).map(|(d, a)| (*d, *a)))
            }
            _ => Vec::new(),
        })
    }

    async fn find_all_availability_days(
        &self,
        room_id: Uuid,
    ) -> Result<Vec<AvailabilityDay>, AppError> {
        let state = self.state.lock().await;
        Ok(match state.calendars.get(&room_id) {
            Some(calendar) => rows(room_id, calendar.iter().map(|(d, a)| (*d, *a))),
            None => Vec::new(),
        })
    }

    async fn insert_availability_days(
        &self,
        room_id: Uuid,
        days: &[NaiveDate],
    ) -> Result<u64, AppError> {
        let mut state = self.state.lock().await;
        let calendar = state.calendars.entry(room_id).or_default();
        let mut inserted = 0;
        for day in days {
            if !calendar.contains_key(day) {
                calendar.insert(*day, true);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn update_availability(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        available: bool,
    ) -> Result<u64, AppError> {
        let mut state = self.state.lock().await;
        if !state.is_active(room_id) {
            return Err(AppError::RoomNotFound(room_id));
        }
        let Some(calendar) = state.calendars.get_mut(&room_id) else {
            return Ok(0);
        };
        if start > end {
            return Ok(0);
        }
        let mut affected = 0;
        for (_, is_available) in calendar.range_mut(start..=end) {
            *is_available = available;
            affected += 1;
        }
        Ok(affected)
    }

    async fn hold_availability(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<u64, AppError> {
        let mut state = self.state.lock().await;
        if !state.is_active(room_id) {
            return Err(AppError::RoomNotFound(room_id));
        }
        let calendar = state.calendars.entry(room_id).or_default();

        let wanted: Vec<NaiveDate> = nights(from, until).collect();
        let mut all_free = true;
        for day in &wanted {
            match calendar.get(day) {
                None => {
                    return Err(AppError::InvalidRange(format!(
                        "{from}..{until} extends outside the availability horizon"
                    )))
                }
                Some(false) => all_free = false,
                Some(true) => {}
            }
        }
        if !all_free {
            return Err(AppError::ConcurrentUpdateConflict { room_id });
        }

        for day in &wanted {
            calendar.insert(*day, false);
        }
        Ok(wanted.len() as u64)
    }

    async fn replace_peak_rates(
        &self,
        room_id: Uuid,
        rates: &[NewPeakSeasonRate],
    ) -> Result<Vec<PeakSeasonRate>, AppError> {
        let mut state = self.state.lock().await;
        if !state.is_active(room_id) {
            return Err(AppError::RoomNotFound(room_id));
        }

        let now = Utc::now();
        let mut stored: Vec<PeakSeasonRate> = rates
            .iter()
            .zip(0..)
            .map(|(rate, position)| PeakSeasonRate {
                id: Uuid::new_v4(),
                room_id,
                start_date: rate.start_date,
                end_date: rate.end_date,
                price_change_type: rate.price_change_type,
                price_change_value: rate.price_change_value,
                position,
                created_at: now,
            })
            .collect();
        sort_by_precedence(&mut stored);

        state.peak_rates.insert(room_id, stored.clone());
        Ok(stored)
    }

    async fn set_weekend_peak(
        &self,
        room_id: Uuid,
        rule: Option<WeekendPeakRule>,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        let Some(room) = state.active_room_mut(room_id) else {
            return Ok(false);
        };
        room.weekend_peak_type = rule.map(|r| r.price_change_type);
        room.weekend_peak_value = rule.map(|r| r.price_change_value);
        Ok(true)
    }
}
