//! Seat placement around a round table.
//!
//! Seats are spaced evenly and rotated so the local player always sits at
//! [`LOCAL_SEAT_ANGLE`] (the bottom of the table), with everyone else
//! following in server order. Angles are degrees in `[0, 360)`, measured
//! clockwise from the right-hand side of the table in screen coordinates.

/// Where the local player is drawn.
pub const LOCAL_SEAT_ANGLE: f64 = 90.0;

const FULL_TURN: f64 = 360.0;

/// Anything that can be placed at a seat by name.
pub trait Seated {
    fn seat_name(&self) -> &str;
}

impl Seated for String {
    fn seat_name(&self) -> &str {
        self
    }
}

impl Seated for &str {
    fn seat_name(&self) -> &str {
        self
    }
}

/// Assigns each player an angle, keeping the input order.
///
/// If `local_name` isn't among the players (e.g. a spectator), the first
/// player takes the local seat.
pub fn compute_seats<P: Seated>(players: Vec<P>, local_name: &str) -> Vec<(P, f64)> {
    let count = players.len();
    if count == 0 {
        return Vec::new();
    }
    let local_idx = players
        .iter()
        .position(|player| player.seat_name() == local_name)
        .unwrap_or(0);
    let step = FULL_TURN / count as f64;
    players
        .into_iter()
        .enumerate()
        .map(|(idx, player)| {
            let offset = idx as f64 - local_idx as f64;
            (player, normalize(LOCAL_SEAT_ANGLE + offset * step))
        })
        .collect()
}

fn normalize(angle: f64) -> f64 {
    let angle = angle.rem_euclid(FULL_TURN);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    if angle >= FULL_TURN { 0.0 } else { angle }
}

const COMPASS: [&str; 8] = [
    "right",
    "bottom-right",
    "bottom",
    "bottom-left",
    "left",
    "top-left",
    "top",
    "top-right",
];

/// Names the screen region an angle points at.
pub fn compass(angle: f64) -> &'static str {
    let sector = (normalize(angle) + 22.5) / 45.0;
    COMPASS[(sector.floor() as usize) % COMPASS.len()]
}
