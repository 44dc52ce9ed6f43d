//! Decorative boarding-pass details. Randomness is injected by the caller so
//! the same seed always prints the same pass.
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const AIRLINE_CODE: &str = "WU";
const SEAT_LETTERS: &[u8] = b"ABCDEF";
const GATE_LETTERS: &[u8] = b"ABCDE";
const MAX_ROW: u8 = 40;
const MAX_GATE: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardingPass {
    pub flight_number: String,
    pub seat: String,
    pub gate: String,
}

impl BoardingPass {
    /// Draw a flight number (`WU100`..`WU9999`), seat and gate.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let flight: u16 = rng.gen_range(100..=9_999);
        let row: u8 = rng.gen_range(1..=MAX_ROW);
        let gate: u8 = rng.gen_range(1..=MAX_GATE);
        Self {
            flight_number: format!("{AIRLINE_CODE}{flight}"),
            seat: format!("{row}{}", pick_letter(rng, SEAT_LETTERS)),
            gate: format!("{}{gate}", pick_letter(rng, GATE_LETTERS)),
        }
    }
}

fn pick_letter<R: Rng + ?Sized>(rng: &mut R, letters: &[u8]) -> char {
    char::from(letters[rng.gen_range(0..letters.len())])
}

impl fmt::Display for BoardingPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Flight {} | Seat {} | Gate {}",
            self.flight_number, self.seat, self.gate
        )
    }
}
