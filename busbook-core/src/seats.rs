//! Seat map and the user's seat selection.
use crate::model::{Seat, SeatStatus};
use smallvec::SmallVec;

/// Seats are laid out four abreast with an aisle after the second column.
pub const SEATS_PER_ROW: usize = 4;

/// The last-fetched seat list for a bus and date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatMap {
    seats: Vec<Seat>,
}

impl SeatMap {
    #[must_use]
    pub const fn new(seats: Vec<Seat>) -> Self {
        Self { seats }
    }

    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    #[must_use]
    pub fn get(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.id == seat_id)
    }

    #[must_use]
    pub fn status_of(&self, seat_id: &str) -> Option<SeatStatus> {
        self.get(seat_id).map(|seat| seat.status)
    }

    #[must_use]
    pub fn is_available(&self, seat_id: &str) -> bool {
        self.get(seat_id).is_some_and(Seat::is_available)
    }

    #[must_use]
    pub fn available_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_available()).count()
    }

    /// Rows of at most `per_row` seats in backend order.
    pub fn rows(&self, per_row: usize) -> impl Iterator<Item = &[Seat]> {
        self.seats.chunks(per_row.max(1))
    }
}

/// Why a seat could not be added to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatRejection {
    Booked,
    Unknown,
    LimitReached(usize),
    /// A reservation is in progress; the selection is frozen.
    Locked,
}

/// Result of toggling a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
    Rejected(SeatRejection),
}

/// Seat ids chosen in this session, in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatSelection {
    ids: SmallVec<[String; 6]>,
}

impl SeatSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, seat_id: &str) -> bool {
        self.ids.iter().any(|id| id == seat_id)
    }

    /// Add or remove `seat_id`. Removing is always allowed; adding requires the
    /// seat to be available on `map` and the selection to be under `max_seats`.
    pub fn toggle(&mut self, seat_id: &str, map: &SeatMap, max_seats: usize) -> Toggle {
        if let Some(pos) = self.ids.iter().position(|id| id == seat_id) {
            self.ids.remove(pos);
            return Toggle::Deselected;
        }
        match map.status_of(seat_id) {
            None => Toggle::Rejected(SeatRejection::Unknown),
            Some(SeatStatus::Booked) => Toggle::Rejected(SeatRejection::Booked),
            Some(SeatStatus::Available) if self.ids.len() >= max_seats => {
                Toggle::Rejected(SeatRejection::LimitReached(max_seats))
            }
            Some(SeatStatus::Available) => {
                self.ids.push(seat_id.to_string());
                Toggle::Selected
            }
        }
    }

    /// Drop every selected seat that is no longer available on `map`.
    /// Returns the dropped ids in selection order.
    pub fn reconcile(&mut self, map: &SeatMap) -> Vec<String> {
        let mut dropped = Vec::new();
        self.ids.retain(|id| {
            let keep = map.is_available(id);
            if !keep {
                dropped.push(id.clone());
            }
            keep
        });
        dropped
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fare::Fare;

    fn seat(id: &str, status: SeatStatus) -> Seat {
        Seat {
            id: id.to_string(),
            status,
            price: Fare::from_minor(50_000),
        }
    }

    fn sample_map() -> SeatMap {
        SeatMap::new(vec![
            seat("A1", SeatStatus::Available),
            seat("A2", SeatStatus::Booked),
            seat("A3", SeatStatus::Available),
            seat("A4", SeatStatus::Available),
            seat("B1", SeatStatus::Available),
        ])
    }

    #[test]
    fn toggling_twice_returns_to_unselected() {
        let map = sample_map();
        let mut selection = SeatSelection::new();
        assert_eq!(selection.toggle("A1", &map, 6), Toggle::Selected);
        assert!(selection.contains("A1"));
        assert_eq!(selection.toggle("A1", &map, 6), Toggle::Deselected);
        assert!(selection.is_empty());
    }

    #[test]
    fn booked_seat_is_never_selected() {
        let map = sample_map();
        let mut selection = SeatSelection::new();
        for _ in 0..5 {
            assert_eq!(
                selection.toggle("A2", &map, 6),
                Toggle::Rejected(SeatRejection::Booked)
            );
        }
        assert!(!selection.contains("A2"));
        assert_eq!(
            selection.toggle("Z9", &map, 6),
            Toggle::Rejected(SeatRejection::Unknown)
        );
    }

    #[test]
    fn selection_respects_seat_cap() {
        let map = sample_map();
        let mut selection = SeatSelection::new();
        selection.toggle("A1", &map, 2);
        selection.toggle("A3", &map, 2);
        assert_eq!(
            selection.toggle("A4", &map, 2),
            Toggle::Rejected(SeatRejection::LimitReached(2))
        );
        assert_eq!(selection.ids(), ["A1", "A3"]);
    }

    #[test]
    fn reconcile_drops_seats_booked_elsewhere() {
        let mut selection = SeatSelection::new();
        selection.toggle("A1", &sample_map(), 6);
        selection.toggle("A3", &sample_map(), 6);
        selection.toggle("B1", &sample_map(), 6);

        let fresh = SeatMap::new(vec![
            seat("A1", SeatStatus::Available),
            seat("A3", SeatStatus::Booked),
        ]);
        let dropped = selection.reconcile(&fresh);
        assert_eq!(dropped, ["A3", "B1"]);
        assert_eq!(selection.ids(), ["A1"]);
    }

    #[test]
    fn rows_chunk_seats() {
        let map = sample_map();
        let rows: Vec<usize> = map.rows(SEATS_PER_ROW).map(<[Seat]>::len).collect();
        assert_eq!(rows, [4, 1]);
        assert_eq!(map.available_count(), 4);
    }
}
