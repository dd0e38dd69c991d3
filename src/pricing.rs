// Price calculator for the booking page.
//
// Everything here is a pure derivation from the listing price text, the
// selected dates and the guest count. Callers recompute on every change
// instead of caching a total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::draft::DateRange;

const MILLIS_PER_NIGHT: i64 = 86_400_000;

// Billing model for a stay. The two booking pages in circulation disagree on
// whether the nightly price is per person, so the choice is configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    #[default]
    PerGuestPerNight,
    PerNight,
}

impl PricingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingStrategy::PerGuestPerNight => "per_guest_per_night",
            PricingStrategy::PerNight => "per_night",
        }
    }
}

impl fmt::Display for PricingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_guest_per_night" | "per_guest" => Ok(PricingStrategy::PerGuestPerNight),
            "per_night" => Ok(PricingStrategy::PerNight),
            other => Err(format!("unknown pricing strategy: {}", other)),
        }
    }
}

// Breakdown shown in the price summary panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub unit_price: u64,
    pub nights: u64,
    pub guests: u64,
    pub total: u64,
}

/// Extracts the numeric amount from a display price such as `"Rs. 2,500"`.
///
/// All non-digit characters are dropped, so decimal points are not honoured
/// (`"$ 19.99"` reads as 1999). Text without digits yields 0; amounts too
/// large for a `u64` saturate.
pub fn parse_price(price_text: &str) -> u64 {
    let digits: String = price_text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

// Leading-digit parse of the guest field: "3" and "3 people" are 3, "" and
// "abc" are None. Saturates instead of overflowing on absurd input.
pub fn parse_guest_count(guests: &str) -> Option<u64> {
    let digits: String = guests
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Whole nights between check-in and check-out, rounding partial days up.
/// Returns `None` while either end is unset; an inverted range counts as 0.
pub fn nights(range: &DateRange) -> Option<u64> {
    let (check_in, check_out) = range.bounds()?;
    let millis = (check_out - check_in).num_milliseconds();
    if millis <= 0 {
        return Some(0);
    }
    let whole = millis / MILLIS_PER_NIGHT;
    let nights = if millis % MILLIS_PER_NIGHT == 0 {
        whole
    } else {
        whole + 1
    };
    Some(nights as u64)
}

pub fn quote(
    price_text: &str,
    range: &DateRange,
    guests: &str,
    strategy: PricingStrategy,
) -> Option<PriceQuote> {
    let nights = nights(range)?;
    let guests = parse_guest_count(guests).filter(|g| *g > 0)?;
    let unit_price = parse_price(price_text);

    let per_night = match strategy {
        PricingStrategy::PerGuestPerNight => unit_price.saturating_mul(guests),
        PricingStrategy::PerNight => unit_price,
    };

    Some(PriceQuote {
        unit_price,
        nights,
        guests,
        total: nights.saturating_mul(per_night),
    })
}

/// Total cost of a stay, or 0 when any input is missing.
pub fn compute_total(
    price_text: &str,
    range: &DateRange,
    guests: &str,
    strategy: PricingStrategy,
) -> u64 {
    quote(price_text, range, guests, strategy).map_or(0, |q| q.total)
}
