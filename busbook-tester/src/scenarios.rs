//! Booking-flow scenarios. Each runs against a fresh simulated backend; a
//! few also have browser steps against a live deployment.
use crate::backend::{Fault, SimulatedBackend};
use crate::browser::DetailPage;
use anyhow::{Context, Result, bail, ensure};
use busbook_core::api::{BookingClient, RESERVE_SEATS_PATH, SEAT_DATA_PATH};
use busbook_core::booking::BookingState;
use busbook_core::config::{BookingConfig, PriceLookup};
use busbook_core::controller::BookingController;
use busbook_core::fare::Fare;
use busbook_core::image::{ImageSlot, ImageSource, ImageStatus, ImageTransform, cache_token};
use busbook_core::model::BookingKey;
use busbook_core::notify::{NoticeLevel, NoticeLog};
use busbook_core::price::PriceEndpoint;
use busbook_core::reservation::ReservationPhase;
use busbook_core::seats::{SeatRejection, Toggle};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;

const DRIVE_PHOTO: &str = "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOp/view?usp=sharing";

#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub bus_id: String,
    pub date: NaiveDate,
    pub seed: u64,
    pub config: BookingConfig,
    pub verbose: bool,
}

impl ScenarioCtx {
    fn key(&self) -> BookingKey {
        BookingKey::new(self.bus_id.clone(), self.date)
    }

    fn backend(&self) -> Rc<SimulatedBackend> {
        Rc::new(SimulatedBackend::generate(&self.bus_id, self.seed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Smoke,
    SeatToggle,
    TotalPrice,
    BookedSeat,
    SeatCap,
    PriceFallback,
    LegacyPrice,
    StalePrice,
    ReservationRejected,
    CancelCheckout,
    SeatReleased,
    ImageFallback,
}

impl Scenario {
    pub const ALL: [Self; 12] = [
        Self::Smoke,
        Self::SeatToggle,
        Self::TotalPrice,
        Self::BookedSeat,
        Self::SeatCap,
        Self::PriceFallback,
        Self::LegacyPrice,
        Self::StalePrice,
        Self::ReservationRejected,
        Self::CancelCheckout,
        Self::SeatReleased,
        Self::ImageFallback,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::SeatToggle => "seat-toggle",
            Self::TotalPrice => "total-price",
            Self::BookedSeat => "booked-seat",
            Self::SeatCap => "seat-cap",
            Self::PriceFallback => "price-fallback",
            Self::LegacyPrice => "legacy-price",
            Self::StalePrice => "stale-price",
            Self::ReservationRejected => "reservation-rejected",
            Self::CancelCheckout => "cancel-checkout",
            Self::SeatReleased => "seat-released",
            Self::ImageFallback => "image-fallback",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Smoke => "Load, pick seats and points, reserve and hand off to checkout",
            Self::SeatToggle => "Selecting a seat twice leaves it unselected",
            Self::TotalPrice => "Total is seat count times the effective per-seat fare",
            Self::BookedSeat => "Booked seats can never be selected",
            Self::SeatCap => "Selection stops at the configured seat limit",
            Self::PriceFallback => "No custom price after every endpoint was tried",
            Self::LegacyPrice => "A price only the legacy endpoint knows is still found",
            Self::StalePrice => "A price for a superseded pickup/drop pair is discarded",
            Self::ReservationRejected => "A rejected reservation stays put and refetches seats",
            Self::CancelCheckout => "Cancelling the confirmation makes no request",
            Self::SeatReleased => "Seats booked elsewhere drop out of the selection",
            Self::ImageFallback => "Failing primary photo loads from the thumbnail after two fallbacks",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    #[must_use]
    pub const fn has_browser_steps(self) -> bool {
        matches!(self, Self::Smoke | Self::SeatToggle | Self::BookedSeat)
    }

    /// Run against a fresh simulated backend.
    ///
    /// # Errors
    /// Returns the first broken expectation.
    pub async fn run_logic(self, ctx: &ScenarioCtx) -> Result<()> {
        match self {
            Self::Smoke => smoke(ctx).await,
            Self::SeatToggle => seat_toggle(ctx).await,
            Self::TotalPrice => total_price(ctx).await,
            Self::BookedSeat => booked_seat(ctx).await,
            Self::SeatCap => seat_cap(ctx).await,
            Self::PriceFallback => price_fallback(ctx).await,
            Self::LegacyPrice => legacy_price(ctx).await,
            Self::StalePrice => stale_price(ctx).await,
            Self::ReservationRejected => reservation_rejected(ctx).await,
            Self::CancelCheckout => cancel_checkout(ctx).await,
            Self::SeatReleased => seat_released(ctx).await,
            Self::ImageFallback => image_fallback(ctx),
        }
    }

    /// Drive a deployed UI.
    ///
    /// # Errors
    /// Fails when a page element is missing or behaves unexpectedly, or when
    /// the scenario has no browser steps.
    pub async fn run_browser(self, page: &DetailPage<'_>) -> Result<()> {
        match self {
            Self::Smoke => {
                page.open().await?;
                page.wait_for_seats().await?;
                page.wait_for_title().await
            }
            Self::SeatToggle => {
                page.open().await?;
                page.wait_for_seats().await?;
                let seat = page.first_available_seat().await?;
                page.toggle(&seat).await?;
                ensure!(page.is_pressed(&seat).await?, "seat {seat} not selected after click");
                page.toggle(&seat).await?;
                ensure!(!page.is_pressed(&seat).await?, "seat {seat} still selected after second click");
                Ok(())
            }
            Self::BookedSeat => {
                page.open().await?;
                page.wait_for_seats().await?;
                match page.first_booked_seat().await? {
                    Some(seat) => ensure!(page.is_disabled(&seat).await?, "booked seat {seat} is clickable"),
                    None => log::info!("no booked seats on this trip"),
                }
                Ok(())
            }
            _ => bail!("{} has no browser steps", self.key()),
        }
    }
}

type Controller = BookingController<Rc<SimulatedBackend>, NoticeLog>;

struct Harness {
    backend: Rc<SimulatedBackend>,
    notices: NoticeLog,
    ctl: Controller,
}

impl Harness {
    fn new(ctx: &ScenarioCtx) -> Self {
        let backend = ctx.backend();
        let notices = NoticeLog::new();
        let ctl = BookingController::new(
            Rc::clone(&backend),
            notices.clone(),
            ctx.key(),
            &ctx.config,
        );
        Self {
            backend,
            notices,
            ctl,
        }
    }

    async fn loaded(ctx: &ScenarioCtx) -> Result<Self> {
        let mut h = Self::new(ctx);
        ensure!(h.ctl.load_route().await, "bus details did not load");
        ensure!(h.ctl.load_seats().await, "seat data did not load");
        ensure!(h.ctl.load_route_points().await, "route points did not load");
        ensure!(h.ctl.state().seats_loaded(), "seat map not marked loaded");
        Ok(h)
    }

    fn free_seats(&self, n: usize) -> Result<Vec<String>> {
        let seats: Vec<String> = self.backend.available_seats().into_iter().take(n).collect();
        ensure!(seats.len() == n, "need {n} free seats, inventory has {}", seats.len());
        Ok(seats)
    }

    fn select(&mut self, seats: &[String]) -> Result<()> {
        for seat in seats {
            let outcome = self.ctl.select_seat(seat);
            ensure!(outcome == Toggle::Selected, "selecting {seat} gave {outcome:?}");
        }
        Ok(())
    }

    async fn choose(&mut self, pickup: &str, drop: &str) {
        self.ctl.choose_pickup(Some(pickup)).await;
        self.ctl.choose_drop(Some(drop)).await;
    }
}

async fn smoke(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let seats = h.free_seats(2)?;
    h.select(&seats)?;
    h.choose("p2", "d1").await;

    let custom = h.backend.custom_price("p2", "d1").context("inventory lacks p2→d1 price")?;
    ensure!(h.ctl.state().custom_fare() == Some(custom), "custom fare not applied");
    ensure!(h.ctl.request_checkout(), "checkout was refused");
    ensure!(h.ctl.state().phase() == ReservationPhase::AwaitingConfirmation);

    let snapshot = h.ctl.confirm_reservation().await.context("reservation failed")?;
    ensure!(snapshot.seat_ids == seats, "snapshot seats {:?}", snapshot.seat_ids);
    ensure!(snapshot.total == custom.times(2), "snapshot total {}", snapshot.total);
    ensure!(snapshot.reservation.reservation_id.starts_with("R-"));
    ensure!(seats.iter().all(|s| h.backend.is_booked(s)), "backend did not book the seats");
    ensure!(h.ctl.state().selection().is_empty(), "selection survived a reservation");
    ensure!(h.ctl.state().phase() == ReservationPhase::NavigatedToCheckout);
    ensure!(h.notices.count(NoticeLevel::Success) == 1, "no success notice");
    if ctx.verbose {
        println!("   reserved {:?} as {}", seats, snapshot.reservation.reservation_id);
    }
    Ok(())
}

async fn seat_toggle(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let seat = h.free_seats(1)?.remove(0);
    ensure!(h.ctl.select_seat(&seat) == Toggle::Selected);
    ensure!(h.ctl.select_seat(&seat) == Toggle::Deselected);
    ensure!(!h.ctl.state().selection().contains(&seat), "{seat} still selected");
    Ok(())
}

async fn total_price(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let base = h.backend.base_price();
    ensure!(h.ctl.state().base_fare() == base, "base fare {}", h.ctl.state().base_fare());

    let seats = h.free_seats(3)?;
    h.select(&seats)?;
    ensure!(h.ctl.state().total_price() == base.times(3), "base total");

    h.choose("p2", "d1").await;
    let custom = h.backend.custom_price("p2", "d1").context("inventory lacks p2→d1 price")?;
    ensure!(h.ctl.state().total_price() == custom.times(3), "custom total");

    h.ctl.choose_pickup(Some("p1")).await;
    ensure!(h.ctl.state().custom_fare().is_none(), "stale custom fare kept");
    ensure!(h.ctl.state().total_price() == base.times(3), "total after pair change");
    Ok(())
}

async fn booked_seat(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::new(ctx);
    let seat = match h.backend.booked_seats().first() {
        Some(seat) => seat.clone(),
        None => {
            h.backend.book_elsewhere("E4");
            "E4".to_string()
        }
    };
    ensure!(h.ctl.load_seats().await, "seat data did not load");
    let outcome = h.ctl.select_seat(&seat);
    ensure!(
        outcome == Toggle::Rejected(SeatRejection::Booked),
        "booked seat {seat} gave {outcome:?}"
    );
    ensure!(h.ctl.state().selection().is_empty());
    ensure!(h.notices.count(NoticeLevel::Warning) == 1, "rejection not reported");
    Ok(())
}

async fn seat_cap(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let max = ctx.config.max_seats;
    let seats = h.free_seats(max + 1)?;
    h.select(&seats[..max])?;
    let outcome = h.ctl.select_seat(&seats[max]);
    ensure!(
        outcome == Toggle::Rejected(SeatRejection::LimitReached(max)),
        "seat {} past the limit gave {outcome:?}",
        max + 1
    );
    ensure!(h.ctl.state().selection().len() == max);
    Ok(())
}

async fn price_fallback(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    h.choose("p1", "d1").await;
    ensure!(h.ctl.state().custom_fare().is_none(), "unexpected custom fare");
    ensure!(h.ctl.state().unit_fare() == h.backend.base_price(), "unit fare is not the base fare");
    let expected = PriceEndpoint::chain(ctx.config.price_lookup);
    for endpoint in expected {
        ensure!(
            h.backend.calls_to(endpoint.path()) == 1,
            "{} called {} times",
            endpoint.path(),
            h.backend.calls_to(endpoint.path())
        );
    }
    Ok(())
}

async fn legacy_price(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    h.choose("p1", "d2").await;
    match ctx.config.price_lookup {
        PriceLookup::Fallback => ensure!(
            h.ctl.state().custom_fare() == Some(Fare::from_minor(87_550)),
            "legacy price not found: {:?}",
            h.ctl.state().custom_fare()
        ),
        PriceLookup::Strict => ensure!(
            h.ctl.state().custom_fare().is_none(),
            "strict lookup read a legacy endpoint"
        ),
    }
    Ok(())
}

async fn stale_price(ctx: &ScenarioCtx) -> Result<()> {
    let backend = ctx.backend();
    let client = BookingClient::new(Rc::clone(&backend), ctx.config.price_lookup);
    let mut state = BookingState::new(ctx.key(), ctx.config.max_seats);
    let points = client.route_points(&ctx.key()).await?;
    ensure!(state.apply_route_points(points).is_none());

    ensure!(state.choose_pickup(Some("p2")).is_none(), "lookup issued without a drop");
    let first = state.choose_drop(Some("d1")).context("no lookup for p2→d1")?;
    let second = state.choose_pickup(Some("p3")).context("no lookup for p3→d1")?;

    // Answers arrive newest first.
    let newer = client.resolve_custom_price(&second.query).await;
    let older = client.resolve_custom_price(&first.query).await;
    ensure!(state.apply_custom_price(&second, newer), "current price dropped");
    ensure!(!state.apply_custom_price(&first, older), "superseded price applied");
    ensure!(
        state.custom_fare() == backend.custom_price("p3", "d1"),
        "custom fare {:?} is not the p3→d1 price",
        state.custom_fare()
    );
    Ok(())
}

async fn reservation_rejected(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let seats = h.free_seats(1)?;
    h.select(&seats)?;
    h.choose("p2", "d1").await;
    ensure!(h.ctl.request_checkout(), "checkout was refused");

    let message = format!("Seat {} is no longer available", seats[0]);
    h.backend.fail_next(RESERVE_SEATS_PATH, Fault::Reject(message.clone()));
    let fetches = h.backend.calls_to(SEAT_DATA_PATH);

    ensure!(h.ctl.confirm_reservation().await.is_none(), "rejected reservation produced a checkout");
    ensure!(
        h.backend.calls_to(SEAT_DATA_PATH) == fetches + 1,
        "seat data not refetched after rejection"
    );
    let last = h.notices.last().context("no notice after rejection")?;
    ensure!(last.level == NoticeLevel::Error && last.message == message, "notice {last:?}");
    ensure!(h.ctl.state().phase() == ReservationPhase::Idle);
    Ok(())
}

async fn cancel_checkout(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let seats = h.free_seats(1)?;
    h.select(&seats)?;
    h.choose("p1", "d1").await;
    ensure!(h.ctl.request_checkout(), "checkout was refused");

    let calls = h.backend.total_calls();
    ensure!(h.ctl.cancel_checkout(), "cancel refused");
    ensure!(h.backend.total_calls() == calls, "cancel touched the network");
    ensure!(h.ctl.state().phase() == ReservationPhase::Idle);
    ensure!(h.ctl.state().selection().len() == 1, "cancel dropped the selection");
    Ok(())
}

async fn seat_released(ctx: &ScenarioCtx) -> Result<()> {
    let mut h = Harness::loaded(ctx).await?;
    let seats = h.free_seats(2)?;
    h.select(&seats)?;
    h.backend.book_elsewhere(&seats[1]);

    ensure!(h.ctl.load_seats().await, "refresh failed");
    ensure!(
        h.ctl.state().selection().ids() == &seats[..1],
        "selection after refresh: {:?}",
        h.ctl.state().selection().ids()
    );
    ensure!(h.notices.count(NoticeLevel::Warning) == 1, "release not reported");

    h.backend.fail_next(SEAT_DATA_PATH, Fault::Down);
    ensure!(!h.ctl.load_seats().await, "failed refresh reported success");
    ensure!(!h.ctl.state().seats().is_empty(), "failed refresh cleared the map");
    Ok(())
}

fn image_fallback(ctx: &ScenarioCtx) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    let mut slot = ImageSlot::new(ImageSource::classify(DRIVE_PHOTO), cache_token(0, &mut rng));
    ensure!(slot.current_transform() == Some(ImageTransform::Proxy));

    ensure!(slot.on_failed(0) == ImageStatus::Loading, "gave up after the proxy");
    ensure!(slot.on_failed(1) == ImageStatus::Loading, "gave up after the direct link");
    ensure!(slot.current_transform() == Some(ImageTransform::Thumbnail));
    ensure!(slot.on_loaded(2), "thumbnail load ignored");
    ensure!(slot.status() == ImageStatus::Loaded);
    ensure!(
        slot.fallback_transitions() == 2,
        "{} fallback transitions",
        slot.fallback_transitions()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Builder;

    fn ctx() -> ScenarioCtx {
        ScenarioCtx {
            bus_id: "bus-7".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            seed: 1337,
            config: BookingConfig::default(),
            verbose: false,
        }
    }

    #[test]
    fn keys_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::from_key(scenario.key()), Some(scenario));
        }
        assert_eq!(Scenario::from_key("nope"), None);
    }

    #[test]
    fn every_scenario_passes_against_the_simulator() {
        let rt = Builder::new_current_thread().build().expect("runtime");
        for seed in [1, 42, 1337] {
            let ctx = ScenarioCtx { seed, ..ctx() };
            for scenario in Scenario::ALL {
                rt.block_on(scenario.run_logic(&ctx))
                    .unwrap_or_else(|err| panic!("{} (seed {seed}): {err:#}", scenario.key()));
            }
        }
    }

    #[test]
    fn strict_lookup_stops_after_one_endpoint() {
        let rt = Builder::new_current_thread().build().expect("runtime");
        let mut ctx = ctx();
        ctx.config.price_lookup = PriceLookup::Strict;
        rt.block_on(Scenario::PriceFallback.run_logic(&ctx)).unwrap();
        rt.block_on(Scenario::LegacyPrice.run_logic(&ctx)).unwrap();
    }
}
