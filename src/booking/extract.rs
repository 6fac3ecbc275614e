use crate::booking::model::{BookingOption, CancellationPolicy, Room};
use crate::booking::profile::SiteProfile;
use crate::browser::PageDriver;
use crate::core::BrowserTrait;
use crate::errors::Result;
use crate::resolver::price::{extract_price, format_eur};
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use tracing::debug;

/// Raw card data as harvested in-page, before any price parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price_text: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    availability_text: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    book_selector: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOption {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price_text: Option<String>,
    #[serde(default)]
    meal_plan: Option<String>,
    #[serde(default)]
    cancellation_text: Option<String>,
    #[serde(default)]
    special_offer: Option<String>,
    #[serde(default)]
    book_selector: Option<String>,
}

/// Harvest every room card on the results page.
///
/// The in-page script only collects text; prices and ids are derived on the
/// Rust side so locale parsing stays testable.
pub async fn extract_rooms<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    profile: &SiteProfile,
) -> Result<Vec<Room>> {
    let script = format!(
        r#"(function() {{
            const tryText = (root, selectors) => {{
                for (const sel of selectors) {{
                    try {{
                        const el = root.querySelector(sel);
                        if (el && el.textContent.trim()) return el.textContent.trim();
                    }} catch (e) {{}}
                }}
                return null;
            }};
            const cards = document.querySelectorAll({card_sel});
            const out = [];
            cards.forEach(card => {{
                const name = tryText(card, ['h2', 'h3', '[class*="roomName"]', '[class*="RoomName"]', '[class*="title"]']);
                const priceText = tryText(card, ['[class*="price"]', '[class*="Price"]', '[class*="amount"]']);
                const description = tryText(card, ['p', '[class*="description"]', '[class*="Description"]']);
                const features = [];
                card.querySelectorAll('li, [class*="feature"], [class*="amenity"]').forEach(f => {{
                    const t = f.textContent.trim();
                    if (t && t.length < 80 && features.length < 12) features.push(t);
                }});
                const availabilityText = tryText(card, ['[class*="availab"]', '[class*="Availab"]', '[class*="remaining"]']);
                const images = [];
                card.querySelectorAll('img[src]').forEach(img => {{
                    if (images.length < 4) images.push(img.src);
                }});
                const options = [];
                card.querySelectorAll('[class*="RatePlan"], [class*="ratePlan"], [class*="offer"], [class*="Offer"]').forEach(opt => {{
                    if (options.length >= 8) return;
                    options.push({{
                        name: tryText(opt, ['h4', '[class*="name"]', '[class*="title"]']),
                        description: tryText(opt, ['p', '[class*="description"]']),
                        priceText: tryText(opt, ['[class*="price"]', '[class*="Price"]']),
                        mealPlan: tryText(opt, ['[class*="meal"]', '[class*="board"]']),
                        cancellationText: tryText(opt, ['[class*="cancel"]', '[class*="Cancel"]', '[class*="refund"]']),
                        specialOffer: tryText(opt, ['[class*="special"]', '[class*="promo"]', '[class*="badge"]'])
                    }});
                }});
                out.push({{ name, priceText, description, features, availabilityText, images, options }});
            }});
            return out;
        }})()"#,
        card_sel = serde_json::to_string(&profile.room_card_selector)?,
    );

    let value = driver.eval(&script).await?;
    let raw: Vec<RawCard> = serde_json::from_value(value).unwrap_or_default();
    debug!(cards = raw.len(), "room cards harvested");

    let rooms = raw
        .into_iter()
        .enumerate()
        .map(|(i, card)| build_room(i, card))
        .collect();
    Ok(rooms)
}

fn build_room(index: usize, card: RawCard) -> Room {
    let room_number = index + 1;
    let price = card.price_text.as_deref().and_then(extract_price);
    let availability = card.availability_text.clone();
    let limited = availability
        .as_deref()
        .map(|t| {
            let t = t.to_lowercase();
            t.contains("ultim") || t.contains("last") || t.contains("remaining") || t.contains("solo")
        })
        .unwrap_or(false);

    let booking_options = card
        .options
        .into_iter()
        .enumerate()
        .map(|(j, opt)| build_option(room_number, j + 1, opt))
        .collect();

    Room {
        id: format!("room-{room_number}"),
        name: card.name.unwrap_or_else(|| format!("Room {room_number}")),
        price,
        formatted_price: price.map(format_eur),
        currency: "EUR".to_string(),
        description: card.description,
        features: card.features,
        main_book_selector: card.book_selector,
        available: true,
        limited_availability: limited,
        availability_info: availability,
        images: card.images,
        booking_options,
    }
}

fn build_option(room_number: usize, option_number: usize, opt: RawOption) -> BookingOption {
    let price = opt.price_text.as_deref().and_then(extract_price);
    let cancellation_policy = opt.cancellation_text.map(|text| {
        let lower = text.to_lowercase();
        let refundable = !lower.contains("non rimborsabile") && !lower.contains("non-refundable");
        CancellationPolicy { text, refundable }
    });
    BookingOption {
        id: format!("rate-{room_number}-{option_number}"),
        name: opt
            .name
            .unwrap_or_else(|| format!("Rate {option_number}")),
        description: opt.description,
        price,
        formatted_price: price.map(format_eur),
        currency: "EUR".to_string(),
        meal_plan: opt.meal_plan,
        cancellation_policy,
        special_offer: opt.special_offer,
        book_selector: opt.book_selector,
        available: true,
    }
}

/// How the final page reads after the confirm click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeClass {
    /// A success indicator and no failure indicator.
    Success,
    /// A failure indicator and no success indicator.
    Failure,
    /// Both kinds of indicator present; treated as failure but flagged so
    /// the message says the page was contradictory.
    Ambiguous,
    /// Neither kind present.
    Unknown,
}

/// Classify the post-submit page text against the profile's indicators.
pub fn classify_outcome(page_text: &str, profile: &SiteProfile) -> OutcomeClass {
    let text = page_text.to_lowercase();
    let success = profile
        .success_indicators
        .iter()
        .any(|ind| text.contains(&ind.to_lowercase()));
    let failure = profile
        .failure_indicators
        .iter()
        .any(|ind| text.contains(&ind.to_lowercase()));
    match (success, failure) {
        (true, false) => OutcomeClass::Success,
        (false, true) => OutcomeClass::Failure,
        (true, true) => OutcomeClass::Ambiguous,
        (false, false) => OutcomeClass::Unknown,
    }
}

/// Flatten an HTML document to visible-ish text for classification.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look for a booking reference code near a confirmation keyword. The code
/// must contain a digit, which keeps ordinary words out of the capture.
pub fn find_booking_reference(page_text: &str) -> Option<String> {
    let re = Regex::new(
        r"(?i)(?:riferimento|reference|conferma|confirmation|prenotazione)[^\r\n]{0,40}?\b([A-Z]{0,4}-?[0-9][0-9A-Z-]{4,14})\b",
    )
    .ok()?;
    re.captures(page_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_success() {
        let profile = SiteProfile::default();
        assert_eq!(
            classify_outcome("La tua prenotazione confermata! Grazie.", &profile),
            OutcomeClass::Success
        );
    }

    #[test]
    fn classifies_failure() {
        let profile = SiteProfile::default();
        assert_eq!(
            classify_outcome("Pagamento fallito, riprova.", &profile),
            OutcomeClass::Failure
        );
    }

    #[test]
    fn both_indicators_are_ambiguous() {
        let profile = SiteProfile::default();
        assert_eq!(
            classify_outcome("Booking confirmed. Errore nel modulo newsletter.", &profile),
            OutcomeClass::Ambiguous
        );
    }

    #[test]
    fn no_indicators_is_unknown() {
        let profile = SiteProfile::default();
        assert_eq!(
            classify_outcome("Benvenuto in hotel", &profile),
            OutcomeClass::Unknown
        );
    }

    #[test]
    fn strips_html_before_classifying() {
        let text = html_to_text("<html><body><h1>Booking confirmed</h1><p>Ref 12345</p></body></html>");
        assert!(text.contains("Booking confirmed"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn finds_reference_code() {
        assert_eq!(
            find_booking_reference("Riferimento prenotazione: AB12-3456. Grazie!"),
            Some("AB12-3456".to_string())
        );
        assert_eq!(find_booking_reference("Nessun codice qui"), None);
    }
}
