//! In-memory stand-in for the booking backend.
//!
//! Serves the same paths and payload shapes as the real service from a
//! seeded inventory, records every call, and lets scenarios inject faults per
//! path.
use async_trait::async_trait;
use busbook_core::api::{
    ApiError, HttpTransport, RESERVE_SEATS_PATH, ROUTE_POINTS_PATH, SEAT_DATA_PATH, bus_path,
};
use busbook_core::fare::Fare;
use busbook_core::model::ReservationIntent;
use busbook_core::price::PriceEndpoint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};

const ROWS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// A failure to serve instead of the normal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The connection fails outright.
    Down,
    /// Non-2xx status with a message body.
    Status(u16, String),
    /// `{"success": false, "message": ...}`.
    Reject(String),
    /// An arbitrary 2xx body.
    Body(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct PointSpec {
    id: &'static str,
    name: &'static str,
    time: &'static str,
}

const PICKUPS: [PointSpec; 3] = [
    PointSpec {
        id: "p2",
        name: "Swargate",
        time: "21:30",
    },
    PointSpec {
        id: "p1",
        name: "Shivajinagar",
        time: "21:00",
    },
    PointSpec {
        id: "p3",
        name: "Katraj",
        time: "21:50",
    },
];

const DROPS: [PointSpec; 2] = [
    PointSpec {
        id: "d2",
        name: "Mapusa",
        time: "07:40",
    },
    PointSpec {
        id: "d1",
        name: "Panaji",
        time: "07:10",
    },
];

#[derive(Debug, Clone)]
struct Inventory {
    bus_id: String,
    base_price: Fare,
    booked: BTreeSet<String>,
    /// Served by the primary custom-price endpoint.
    custom: HashMap<(String, String), Fare>,
    /// Only the legacy route-price endpoint knows these.
    legacy: HashMap<(String, String), Fare>,
    next_reservation: u32,
}

/// Seat ids in map order: `A1`..`E4`.
#[must_use]
pub fn seat_ids() -> Vec<String> {
    ROWS.iter()
        .flat_map(|row| (1..=4).map(move |n| format!("{row}{n}")))
        .collect()
}

#[derive(Debug)]
pub struct SimulatedBackend {
    inventory: RefCell<Inventory>,
    standing: RefCell<HashMap<String, Fault>>,
    queued: RefCell<HashMap<String, VecDeque<Fault>>>,
    calls: RefCell<Vec<Call>>,
}

impl SimulatedBackend {
    /// Build an inventory for `bus_id` from `seed`: the base fare and which
    /// seats are already booked vary with the seed. Rows `A` and `B` always
    /// start free so every scenario has seats to pick.
    #[must_use]
    pub fn generate(bus_id: &str, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let base_price = Fare::from_minor(rng.gen_range(8..=15) * 10_000);
        let booked = seat_ids()
            .into_iter()
            .filter(|id| !id.starts_with(['A', 'B']) && rng.gen_bool(0.3))
            .collect();

        let pair = |p: &str, d: &str| (p.to_string(), d.to_string());
        let mut custom = HashMap::new();
        custom.insert(pair("p2", "d1"), Fare::from_minor(95_000));
        custom.insert(pair("p3", "d1"), Fare::from_minor(rng.gen_range(6..=9) * 10_000));
        let mut legacy = HashMap::new();
        legacy.insert(pair("p1", "d2"), Fare::from_minor(87_550));

        log::debug!("simulated {bus_id} from seed {seed}: base {base_price}");
        Self {
            inventory: RefCell::new(Inventory {
                bus_id: bus_id.to_string(),
                base_price,
                booked,
                custom,
                legacy,
                next_reservation: 1001,
            }),
            standing: RefCell::new(HashMap::new()),
            queued: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn bus_id(&self) -> String {
        self.inventory.borrow().bus_id.clone()
    }

    #[must_use]
    pub fn base_price(&self) -> Fare {
        self.inventory.borrow().base_price
    }

    /// The custom fare the primary endpoint quotes for a pair, if any.
    #[must_use]
    pub fn custom_price(&self, pickup: &str, drop: &str) -> Option<Fare> {
        self.inventory
            .borrow()
            .custom
            .get(&(pickup.to_string(), drop.to_string()))
            .copied()
    }

    #[must_use]
    pub fn is_booked(&self, seat_id: &str) -> bool {
        self.inventory.borrow().booked.contains(seat_id)
    }

    #[must_use]
    pub fn available_seats(&self) -> Vec<String> {
        let inventory = self.inventory.borrow();
        seat_ids()
            .into_iter()
            .filter(|id| !inventory.booked.contains(id))
            .collect()
    }

    #[must_use]
    pub fn booked_seats(&self) -> Vec<String> {
        self.inventory.borrow().booked.iter().cloned().collect()
    }

    /// Someone else books a seat.
    pub fn book_elsewhere(&self, seat_id: &str) {
        self.inventory.borrow_mut().booked.insert(seat_id.to_string());
    }

    /// Serve `fault` on `path` until cleared.
    pub fn fail_always(&self, path: &str, fault: Fault) {
        self.standing.borrow_mut().insert(path.to_string(), fault);
    }

    /// Serve `fault` on the next call to `path` only.
    pub fn fail_next(&self, path: &str, fault: Fault) {
        self.queued
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(fault);
    }

    pub fn clear_faults(&self) {
        self.standing.borrow_mut().clear();
        self.queued.borrow_mut().clear();
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.path == path).count()
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    fn fault_for(&self, path: &str) -> Option<Fault> {
        self.queued
            .borrow_mut()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.standing.borrow().get(path).cloned())
    }

    fn record(
        &self,
        method: &'static str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) {
        self.calls.borrow_mut().push(Call {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            body: body.cloned(),
        });
    }

    fn seat_payload(&self) -> Value {
        let inventory = self.inventory.borrow();
        let seats: Vec<Value> = seat_ids()
            .iter()
            .map(|id| {
                let status = if inventory.booked.contains(id) { "booked" } else { "available" };
                json!({"seatId": id, "status": status, "price": inventory.base_price.as_major()})
            })
            .collect();
        json!({"success": true, "data": {
            "busSeatData": seats,
            "schedule": {"departureTime": "21:00", "arrivalTime": "07:10"}
        }})
    }

    fn bus_payload(&self) -> Value {
        let inventory = self.inventory.borrow();
        json!({"success": true, "data": {
            "from": "Pune",
            "to": "Goa",
            "departureTime": "21:00",
            "arrivalTime": "07:10",
            "price": inventory.base_price.as_major(),
            "busName": "Konkan Sleeper",
            "busNumber": "MH-12-4455",
            "images": [
                "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOp/view",
                "https://cdn.example.test/buses/interior.jpg"
            ]
        }})
    }

    fn points_payload() -> Value {
        let to_json = |points: &[PointSpec]| -> Vec<Value> {
            points
                .iter()
                .map(|p| json!({"id": p.id, "name": p.name, "time": p.time}))
                .collect()
        };
        json!({"success": true, "data": {
            "pickupPoints": to_json(&PICKUPS),
            "dropPoints": to_json(&DROPS),
        }})
    }

    fn price_payload(
        &self,
        endpoint: PriceEndpoint,
        query: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let param = |name: &str| {
            query
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let inventory = self.inventory.borrow();
        match endpoint {
            PriceEndpoint::CustomPrice => {
                let pair = (param("pickupPointId"), param("dropPointId"));
                Ok(match inventory.custom.get(&pair) {
                    Some(fare) => json!({"success": true, "data": {"customPrice": fare.as_major()}}),
                    None => json!({"success": false, "message": "No custom price for this segment"}),
                })
            }
            PriceEndpoint::RoutePrice => {
                let pair = (param("from"), param("to"));
                match inventory.legacy.get(&pair) {
                    Some(fare) => Ok(json!({"price": fare.to_string()})),
                    None => Err(not_found()),
                }
            }
            PriceEndpoint::CustomFare => Err(not_found()),
        }
    }

    fn reserve(&self, body: &Value) -> Result<Value, ApiError> {
        let intent: ReservationIntent = serde_json::from_value(body.clone())?;
        let mut inventory = self.inventory.borrow_mut();
        if intent.bus_id != inventory.bus_id {
            return Err(not_found());
        }
        if let Some(taken) = intent
            .seat_ids
            .iter()
            .find(|id| inventory.booked.contains(*id))
        {
            return Ok(json!({"success": false, "message": format!("Seat {taken} is no longer available")}));
        }
        inventory.booked.extend(intent.seat_ids.iter().cloned());
        let id = inventory.next_reservation;
        inventory.next_reservation += 1;
        Ok(json!({"success": true, "data": {
            "reservationId": format!("R-{id}"),
            "expirationTime": format!("{}T20:45:00Z", intent.date)
        }}))
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not Found".to_string(),
    }
}

fn serve_fault(fault: Fault) -> Result<Value, ApiError> {
    match fault {
        Fault::Down => Err(ApiError::Transport("connection refused".to_string())),
        Fault::Status(status, message) => Err(ApiError::Status { status, message }),
        Fault::Reject(message) => Ok(json!({"success": false, "message": message})),
        Fault::Body(body) => Ok(body),
    }
}

#[async_trait(?Send)]
impl HttpTransport for SimulatedBackend {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.record("GET", path, query, None);
        if let Some(fault) = self.fault_for(path) {
            return serve_fault(fault);
        }
        if path == SEAT_DATA_PATH {
            return Ok(self.seat_payload());
        }
        if path == ROUTE_POINTS_PATH {
            return Ok(Self::points_payload());
        }
        if let Some(endpoint) = [
            PriceEndpoint::CustomPrice,
            PriceEndpoint::RoutePrice,
            PriceEndpoint::CustomFare,
        ]
        .into_iter()
        .find(|e| e.path() == path)
        {
            return self.price_payload(endpoint, query);
        }
        if path == bus_path(&self.bus_id()) {
            return Ok(self.bus_payload());
        }
        Err(not_found())
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.record("POST", path, &[], Some(body));
        if let Some(fault) = self.fault_for(path) {
            return serve_fault(fault);
        }
        if path == RESERVE_SEATS_PATH {
            return self.reserve(body);
        }
        Err(not_found())
    }
}
