use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Everything the engine knows about one booking-engine frontend: selector
/// cascades, page markers, and outcome text indicators.
///
/// The defaults target SimpleBooking storefronts. Keeping this data out of
/// the flow code means a new frontend is a new profile, not new logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProfile {
    /// Combined selector matching one room result card.
    pub room_card_selector: String,
    /// Book/select buttons inside a card, most specific first.
    pub book_button_selectors: Vec<String>,
    pub book_button_texts: Vec<String>,
    /// Button texts that look like book buttons but are not.
    pub book_button_excludes: Vec<String>,
    /// Collapsed-card toggle; clicked before hunting for rate buttons.
    pub expand_toggle_selector: String,

    /// Markers proving the guest-data page was reached.
    pub personal_data_markers: Vec<String>,
    /// Markers proving the payment page was reached.
    pub payment_markers: Vec<String>,

    pub first_name_selectors: Vec<String>,
    pub last_name_selectors: Vec<String>,
    pub email_selectors: Vec<String>,
    pub email_confirm_selectors: Vec<String>,
    pub phone_selectors: Vec<String>,
    pub privacy_checkbox_selectors: Vec<String>,
    pub newsletter_selectors: Vec<String>,
    pub continue_button_texts: Vec<String>,

    /// Radio selecting "pay with credit card".
    pub payment_method_selectors: Vec<String>,
    pub card_holder_selectors: Vec<String>,
    pub card_number_selectors: Vec<String>,
    pub card_expiry_selectors: Vec<String>,
    pub card_cvv_selectors: Vec<String>,
    pub terms_checkbox_selectors: Vec<String>,
    pub submit_button_texts: Vec<String>,

    pub success_indicators: Vec<String>,
    pub failure_indicators: Vec<String>,

    pub cookie_consent_selectors: Vec<String>,
    pub overlay_close_selectors: Vec<String>,

    /// Presence of any card counts as "results have loaded".
    pub no_availability_texts: Vec<String>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::simplebooking()
    }
}

impl SiteProfile {
    pub fn simplebooking() -> Self {
        Self {
            room_card_selector: ".RoomResultBlock, .eio1k2u2, [class*=\"RoomResult\"]"
                .to_string(),
            book_button_selectors: strings(&[
                "button[class*=\"book\"]",
                "button[class*=\"Book\"]",
                "a[class*=\"book\"]",
                "button[type=\"submit\"]",
            ]),
            book_button_texts: strings(&["prenota", "book", "seleziona", "select", "continua"]),
            book_button_excludes: strings(&["info", "dettagli", "details", "mappa", "map"]),
            expand_toggle_selector: "[aria-expanded=\"false\"]".to_string(),

            personal_data_markers: strings(&[
                ".CustomerDataCollectionPage",
                "input[name=\"name\"]",
                "input[name=\"firstName\"]",
                "[class*=\"CustomerData\"]",
            ]),
            payment_markers: strings(&[
                ".GuaranteeDataCollectionPage",
                ".PaymentMethodsForm",
                "[class*=\"PaymentMethod\"]",
                "input[name=\"creditCard.number\"]",
            ]),

            first_name_selectors: strings(&[
                "input[name=\"name\"]",
                "input[name=\"firstName\"]",
                "input[autocomplete=\"given-name\"]",
                "input[placeholder*=\"ome\"]",
            ]),
            last_name_selectors: strings(&[
                "input[name=\"surname\"]",
                "input[name=\"lastName\"]",
                "input[autocomplete=\"family-name\"]",
                "input[placeholder*=\"ognome\"]",
            ]),
            email_selectors: strings(&[
                "input[name=\"email\"]",
                "input[type=\"email\"]",
                "input[autocomplete=\"email\"]",
            ]),
            email_confirm_selectors: strings(&[
                "input[name=\"emailConfirmation\"]",
                "input[name=\"confirmEmail\"]",
                "input[name*=\"emailConfirm\"]",
            ]),
            phone_selectors: strings(&[
                "input[name=\"phone\"]",
                "input[type=\"tel\"]",
                "input[autocomplete=\"tel\"]",
            ]),
            privacy_checkbox_selectors: strings(&[
                "input[name=\"privacyPolicyAcceptance\"]",
                "input[type=\"checkbox\"][name*=\"privacy\"]",
            ]),
            newsletter_selectors: strings(&[
                "input[name=\"newsletter\"]",
                "input[type=\"checkbox\"][name*=\"newsletter\"]",
            ]),
            continue_button_texts: strings(&["continua", "continue", "avanti", "next", "prosegui"]),

            payment_method_selectors: strings(&[
                "input[type=\"radio\"][value=\"104\"]",
                "input[type=\"radio\"][name*=\"paymentMethod\"]",
            ]),
            card_holder_selectors: strings(&["input[name=\"creditCard.holder\"]"]),
            card_number_selectors: strings(&["input[name=\"creditCard.number\"]"]),
            card_expiry_selectors: strings(&["input[name=\"creditCard.expiry\"]"]),
            card_cvv_selectors: strings(&["input[name=\"creditCard.cvv\"]"]),
            terms_checkbox_selectors: strings(&[
                "input[name=\"bookinkAndPrivacyPoliciesAcceptance\"]",
                "input[type=\"checkbox\"][name*=\"Acceptance\"]",
            ]),
            submit_button_texts: strings(&[
                "prenota",
                "conferma",
                "completa",
                "book now",
                "confirm",
            ]),

            success_indicators: strings(&[
                "prenotazione confermata",
                "booking confirmed",
                "grazie per la prenotazione",
                "thank you for your booking",
                "conferma di prenotazione",
            ]),
            failure_indicators: strings(&[
                "errore",
                "error",
                "declined",
                "rifiutat",
                "pagamento fallito",
                "payment failed",
                "non valido",
            ]),

            cookie_consent_selectors: strings(&[
                "#onetrust-accept-btn-handler",
                "button[class*=\"cookie\"][class*=\"accept\"]",
                "[class*=\"CookieBanner\"] button",
            ]),
            overlay_close_selectors: strings(&[
                "[class*=\"modal\"] [class*=\"close\"]",
                "[class*=\"Popup\"] [class*=\"close\"]",
                "button[aria-label=\"Close\"]",
                "button[aria-label=\"Chiudi\"]",
            ]),

            no_availability_texts: strings(&[
                "nessuna disponibilit",
                "no availability",
                "non ci sono camere",
                "sold out",
            ]),
        }
    }
}
