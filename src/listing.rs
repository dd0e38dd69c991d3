// Listing records as served by the marketplace backend
use serde::{Deserialize, Deserializer, Serialize};

pub type ListingId = i64;
pub type OwnerId = i64;

// Currency prefix the backend omits on bare numeric prices
pub const DEFAULT_CURRENCY_PREFIX: &str = "Rs.";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Listing {
    #[serde(
        default,
        alias = "property_id",
        alias = "package_id",
        deserialize_with = "numeric_id"
    )]
    pub id: Option<ListingId>,
    #[serde(default, deserialize_with = "numeric_id")]
    pub owner_id: Option<OwnerId>,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, rename = "image", alias = "images")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "price_text")]
    pub price: String,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "facility_list")]
    pub facilities: Vec<String>,
}

impl Listing {
    // Price as shown on cards and the booking page, e.g. "Rs. 2500"
    pub fn display_price(&self) -> String {
        let trimmed = self.price.trim();
        match trimmed.chars().next() {
            Some(c) if c.is_ascii_digit() => format!("{} {}", DEFAULT_CURRENCY_PREFIX, trimmed),
            _ => trimmed.to_string(),
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    // Route segment the browser navigates to when a card is picked
    pub fn booking_route(&self) -> String {
        format!("/booking/{}", self.owner_name)
    }
}

// Ids come back as numbers from most endpoints and as strings from the
// property listing
fn numeric_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// The backend sends prices as numbers for packages and as strings for
// properties; both are kept as text and parsed by the price calculator.
fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

// Facilities arrive either as a JSON array or as a JSON-encoded string of one
// (the registration form posts them stringified).
fn facility_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(s)) => serde_json::from_str(&s).unwrap_or_default(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_payload_deserializes() {
        let json = r#"{
            "property_id": 7,
            "owner_id": 3,
            "owner_name": "Kasun",
            "title": "Ella Retreat",
            "description": "Hill country stay",
            "location": "Ella, Sri Lanka",
            "city": "Ella",
            "image": ["https://cdn.example/ella.jpg"],
            "price": 2500,
            "facilities": ["Wifi", "Parking"]
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, Some(7));
        assert_eq!(listing.owner_id, Some(3));
        assert_eq!(listing.price, "2500");
        assert_eq!(listing.display_price(), "Rs. 2500");
        assert_eq!(listing.cover_image(), Some("https://cdn.example/ella.jpg"));
        assert_eq!(listing.facilities, vec!["Wifi", "Parking"]);
        assert_eq!(listing.booking_route(), "/booking/Kasun");
    }

    #[test]
    fn test_missing_identity_fields_default_to_none() {
        let listing: Listing =
            serde_json::from_str(r#"{"title": "Orphan", "price": "$ 699"}"#).unwrap();
        assert_eq!(listing.id, None);
        assert_eq!(listing.owner_id, None);
        assert_eq!(listing.display_price(), "$ 699");
        assert!(listing.images.is_empty());
    }

    #[test]
    fn test_stringified_facilities_are_unpacked() {
        let listing: Listing =
            serde_json::from_str(r#"{"id": 1, "facilities": "[\"Bathtub\",\"Kitchen\"]"}"#)
                .unwrap();
        assert_eq!(listing.facilities, vec!["Bathtub", "Kitchen"]);
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let listing: Listing =
            serde_json::from_str(r#"{"property_id": "12", "owner_id": "42", "price": "900"}"#)
                .unwrap();
        assert_eq!(listing.id, Some(12));
        assert_eq!(listing.owner_id, Some(42));
    }
}
