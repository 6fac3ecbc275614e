use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stay dates and party size as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub checkin_date: String,
    pub checkout_date: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

/// Target property. `base_url` points at the property's booking engine and
/// may already carry query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    pub base_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub accept_newsletter: bool,
}

/// Payment-step input. Card fields are optional so a test-mode run can stop
/// before ever needing them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub card_expiry: Option<String>,
    #[serde(default)]
    pub card_holder: Option<String>,
    #[serde(default)]
    pub card_cvv: Option<String>,
    #[serde(default)]
    pub accept_newsletter: bool,
}

/// One bookable room as extracted from the results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub formatted_price: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Best known selector for this card's primary book button.
    #[serde(default)]
    pub main_book_selector: Option<String>,
    pub available: bool,
    #[serde(default)]
    pub limited_availability: bool,
    #[serde(default)]
    pub availability_info: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub booking_options: Vec<BookingOption>,
}

/// One rate plan inside a room card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Option<f64>,
    pub formatted_price: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub meal_plan: Option<String>,
    #[serde(default)]
    pub cancellation_policy: Option<CancellationPolicy>,
    #[serde(default)]
    pub special_offer: Option<String>,
    #[serde(default)]
    pub book_selector: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationPolicy {
    pub text: String,
    pub refundable: bool,
}

/// Record of the room (and optionally the rate) the session committed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedRoom {
    pub room_id: String,
    pub room_name: String,
    pub room_price: Option<f64>,
    #[serde(default)]
    pub option_id: Option<String>,
    /// Selector the click was resolved through, kept for diagnostics.
    #[serde(default)]
    pub selector: Option<String>,
}

/// Verdict of the post-submit page scan. `Unclear` means the page showed
/// both kinds of indicator, or neither; the caller must not treat it as a
/// confirmed success or a confirmed failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOutcome {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failure")]
    Failure,
    #[serde(rename = "unclear")]
    Unclear,
}

/// Final verdict of the payment stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    pub success: bool,
    pub outcome: BookingOutcome,
    pub message: String,
    pub test_mode: bool,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub final_url: Option<String>,
    /// Scanned page text, carried only when the outcome is unclear so the
    /// caller can judge the page itself.
    #[serde(default)]
    pub page_excerpt: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl Room {
    /// 1-based position of this room among the extracted cards, recovered
    /// from its synthetic id (`room-3` -> 3).
    pub fn card_index(&self) -> Option<usize> {
        self.id.strip_prefix("room-")?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_round_trip_camel_case() {
        let json = r#"{"checkinDate":"2026-09-01","checkoutDate":"2026-09-04","adults":2,"children":1}"#;
        let params: SearchParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.checkin_date, "2026-09-01");
        assert_eq!(params.children, 1);
        let back = serde_json::to_value(&params).unwrap();
        assert_eq!(back["checkoutDate"], "2026-09-04");
        assert_eq!(back["adults"], 2);
    }

    #[test]
    fn room_card_index_from_id() {
        let json = r#"{"id":"room-3","name":"Deluxe","price":120.0,"formattedPrice":"€120,00","currency":"EUR","available":true}"#;
        let room: Room = serde_json::from_str(json).unwrap();
        assert_eq!(room.card_index(), Some(3));
        assert!(room.booking_options.is_empty());
    }

    #[test]
    fn hotel_accepts_missing_optionals() {
        let json = r#"{"id":"h1","name":"Hotel Mare","baseUrl":"https://book.example/?hotel=h1"}"#;
        let hotel: Hotel = serde_json::from_str(json).unwrap();
        assert!(hotel.location.is_none());
        assert_eq!(hotel.base_url, "https://book.example/?hotel=h1");
    }
}
