use crate::actions::{ActionExecutor, ActionKind, ActionOutcome, Verification};
use crate::booking::consent::{self, AvailabilityWait};
use crate::booking::extract::{self, OutcomeClass};
use crate::booking::model::{
    BookingData, BookingOption, BookingOutcome, BookingResult, PersonalData, Room,
};
use crate::booking::profile::SiteProfile;
use crate::browser::{navigation, PageDriver};
use crate::core::{BrowserTrait, ResolverConfig, SessionConfig};
use crate::errors::{BookingError, Result};
use crate::resolver::{ElementResolver, Scope, Strategy};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Navigate to the availability URL and get the results page ready:
/// retried navigation, DOM ready, cookie banner, overlays, results wait.
pub async fn open_results<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    session_cfg: &SessionConfig,
    resolver_cfg: &ResolverConfig,
    profile: &SiteProfile,
    url: &str,
) -> Result<AvailabilityWait> {
    let retries = session_cfg.navigation_retries.max(1);
    let mut last_err: Option<BookingError> = None;
    let mut navigated = false;
    for attempt in 1..=retries {
        match driver.navigate(url).await {
            Ok(()) => {
                navigated = true;
                break;
            }
            Err(e) => {
                warn!(attempt, error = %e, "navigation failed");
                last_err = Some(e);
                if attempt < retries {
                    tokio::time::sleep(Duration::from_millis(1000)).await;
                }
            }
        }
    }
    if !navigated {
        let detail = last_err.map(|e| e.to_string()).unwrap_or_default();
        return Err(BookingError::TimeoutError(format!(
            "navigation retries exhausted: {detail}"
        )));
    }

    navigation::wait_for_dom_ready(
        driver,
        Duration::from_millis(session_cfg.navigation_timeout_ms),
        Duration::from_millis(resolver_cfg.poll_interval_ms),
    )
    .await?;

    if let Ok(title) = driver.title().await {
        debug!(%title, "results page loaded");
    }

    // Banner and popup dismissal is best effort: a failed probe must not
    // kill the search.
    if let Err(e) = consent::accept_cookies(driver, profile).await {
        debug!(error = %e, "cookie consent probe failed");
    }
    if let Err(e) = consent::close_overlays(
        driver,
        profile,
        Duration::from_millis(resolver_cfg.overlay_budget_ms),
    )
    .await
    {
        debug!(error = %e, "overlay dismissal failed");
    }

    consent::wait_for_results(driver, profile, resolver_cfg).await
}

/// Result of the room-selection click.
pub struct SelectionAdvance {
    pub outcome: ActionOutcome,
    /// Strategy description the winning resolution came from.
    pub via: String,
    /// Whether the guest-data page markers were visible after the click.
    pub on_customer_data_page: bool,
}

/// Click the book button for `room` (or one of its rate plans), scoped to
/// that room's card.
pub async fn select_room<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    resolver_cfg: &ResolverConfig,
    profile: &SiteProfile,
    room: &Room,
    option: Option<&BookingOption>,
) -> Result<SelectionAdvance> {
    let card_index = room.card_index().unwrap_or(1);

    // Stale-scope probe: the card grid seen at extraction time must still
    // be on the page.
    let cards = driver.count(&profile.room_card_selector).await?;
    if cards == 0 {
        return Err(BookingError::HardResolutionFailure {
            stage: "room-selection".to_string(),
            intent: "room card grid".to_string(),
            attempted: vec![format!("count({})", profile.room_card_selector)],
        });
    }
    if card_index > cards {
        debug!(card_index, cards, "card index out of range, scope falls back to the first card");
    }
    let scope = Scope::card(profile.room_card_selector.clone(), card_index).clamped(cards);

    expand_card_if_collapsed(driver, profile, &scope).await;

    let mut strategies: Vec<Strategy> = Vec::new();
    if let Some(selector) = option.and_then(|o| o.book_selector.as_ref()) {
        strategies.push(Strategy::Hint {
            selector: selector.clone(),
        });
    }
    if let Some(selector) = &room.main_book_selector {
        strategies.push(Strategy::Hint {
            selector: selector.clone(),
        });
    }
    for selector in &profile.book_button_selectors {
        strategies.push(Strategy::Hint {
            selector: selector.clone(),
        });
    }
    strategies.push(Strategy::Index {
        container: profile.room_card_selector.clone(),
        index: card_index,
        target: "button, a, input[type=\"submit\"]".to_string(),
        exclude: profile.book_button_excludes.clone(),
    });
    strategies.push(Strategy::Text {
        role: "button, a".to_string(),
        include: profile.book_button_texts.clone(),
        exclude: profile.book_button_excludes.clone(),
    });
    strategies.push(Strategy::Generic {
        role: "button, a".to_string(),
        target_text: option.map(|o| o.name.clone()).unwrap_or_else(|| room.name.clone()),
        target_price: option.and_then(|o| o.price).or(room.price),
    });

    let resolver = ElementResolver::new(driver, resolver_cfg);
    let resolution = resolver
        .resolve_required(&scope, "room-selection", "book button", &strategies)
        .await?;
    info!(via = resolution.strategy, confidence = resolution.confidence, "book button resolved");

    let executor = ActionExecutor::new(driver, resolver_cfg);
    let outcome = executor
        .perform(
            &resolution.token,
            ActionKind::Click,
            Verification::UrlChangedOrIndicator(profile.personal_data_markers.clone()),
        )
        .await?;

    let on_customer_data_page = driver
        .any_indicator_present(&profile.personal_data_markers)
        .await
        .unwrap_or(false);

    Ok(SelectionAdvance {
        outcome,
        via: resolution.strategy.to_string(),
        on_customer_data_page,
    })
}

/// Collapsed cards hide their rate buttons behind an expand toggle. Best
/// effort: any probe or click error is logged and swallowed, the resolver
/// cascade still gets its chance on the card as-is.
async fn expand_card_if_collapsed<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    profile: &SiteProfile,
    scope: &Scope,
) {
    let probe = match driver.probe(scope, &profile.expand_toggle_selector).await {
        Ok(probe) => probe,
        Err(e) => {
            debug!(error = %e, "expand toggle probe failed");
            return;
        }
    };
    if !probe.usable() {
        return;
    }
    let token = format!("expand-{}", uuid::Uuid::new_v4().simple());
    match driver
        .tag_match(scope, &profile.expand_toggle_selector, &token)
        .await
    {
        Ok(true) => {
            if driver.click_tagged(&token).await.unwrap_or(false) {
                tokio::time::sleep(Duration::from_millis(300)).await;
                debug!("collapsed room card expanded");
            }
        }
        Ok(false) => {}
        Err(e) => debug!(error = %e, "expand toggle tag failed"),
    }
}

/// Fill the guest-data form and continue to payment.
pub async fn fill_personal_data<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    resolver_cfg: &ResolverConfig,
    profile: &SiteProfile,
    data: &PersonalData,
) -> Result<ActionOutcome> {
    let resolver = ElementResolver::new(driver, resolver_cfg);
    let executor = ActionExecutor::new(driver, resolver_cfg);
    let scope = Scope::page();

    fill_required(
        &resolver,
        &executor,
        &scope,
        "first name field",
        &profile.first_name_selectors,
        &data.first_name,
    )
    .await?;
    fill_required(
        &resolver,
        &executor,
        &scope,
        "last name field",
        &profile.last_name_selectors,
        &data.last_name,
    )
    .await?;
    fill_required(
        &resolver,
        &executor,
        &scope,
        "email field",
        &profile.email_selectors,
        &data.email,
    )
    .await?;
    fill_optional(
        &resolver,
        &executor,
        &scope,
        "email confirmation field",
        &profile.email_confirm_selectors,
        &data.email,
    )
    .await?;

    check_optional(
        &resolver,
        &executor,
        &scope,
        "privacy checkbox",
        &profile.privacy_checkbox_selectors,
    )
    .await?;

    if data.accept_newsletter {
        check_optional(
            &resolver,
            &executor,
            &scope,
            "newsletter checkbox",
            &profile.newsletter_selectors,
        )
        .await?;
    }

    let continue_btn = resolver
        .resolve_required(
            &scope,
            "personal-data",
            "continue button",
            &[Strategy::Text {
                role: "button, a, input[type=\"submit\"]".to_string(),
                include: profile.continue_button_texts.clone(),
                exclude: vec![],
            }],
        )
        .await?;

    executor
        .perform(
            &continue_btn.token,
            ActionKind::Click,
            Verification::UrlChangedOrIndicator(profile.payment_markers.clone()),
        )
        .await
}

/// Run the payment stage. In test mode every field is filled but the final
/// submit never fires.
pub async fn complete_booking<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    resolver_cfg: &ResolverConfig,
    profile: &SiteProfile,
    data: &BookingData,
    test_mode: bool,
) -> Result<BookingResult> {
    let resolver = ElementResolver::new(driver, resolver_cfg);
    let executor = ActionExecutor::new(driver, resolver_cfg);
    let scope = Scope::page();

    check_optional(
        &resolver,
        &executor,
        &scope,
        "payment method radio",
        &profile.payment_method_selectors,
    )
    .await?;

    if let Some(phone) = &data.phone {
        fill_optional(&resolver, &executor, &scope, "phone field", &profile.phone_selectors, phone).await?;
    }
    if let Some(holder) = &data.card_holder {
        fill_optional(&resolver, &executor, &scope, "card holder", &profile.card_holder_selectors, holder).await?;
    }
    if let Some(number) = &data.card_number {
        fill_optional(&resolver, &executor, &scope, "card number", &profile.card_number_selectors, number).await?;
    }
    if let Some(expiry) = &data.card_expiry {
        fill_optional(&resolver, &executor, &scope, "card expiry", &profile.card_expiry_selectors, expiry).await?;
    }
    if let Some(cvv) = &data.card_cvv {
        fill_optional(&resolver, &executor, &scope, "card cvv", &profile.card_cvv_selectors, cvv).await?;
    }

    check_optional(
        &resolver,
        &executor,
        &scope,
        "terms checkbox",
        &profile.terms_checkbox_selectors,
    )
    .await?;

    if test_mode {
        info!("test mode: stopping before final submit");
        return Ok(BookingResult {
            success: true,
            outcome: BookingOutcome::Success,
            message: "Test mode: payment form completed, booking not submitted".to_string(),
            test_mode: true,
            booking_reference: None,
            final_url: driver.current_url().await.ok(),
            page_excerpt: None,
            completed_at: Utc::now(),
        });
    }

    let submit = resolver
        .resolve_required(
            &scope,
            "payment",
            "submit button",
            &[Strategy::Text {
                role: "button, input[type=\"submit\"]".to_string(),
                include: profile.submit_button_texts.clone(),
                exclude: vec![],
            }],
        )
        .await?;

    let outcome = executor
        .perform(
            &submit.token,
            ActionKind::Click,
            Verification::UrlChangedOrIndicator(profile.success_indicators.clone()),
        )
        .await?;
    if !outcome.is_confirmed() {
        warn!("submit click unconfirmed; classifying the page anyway");
    }

    let mut page_text = driver.page_text().await.unwrap_or_default();
    if page_text.trim().is_empty() {
        // Some confirmation pages render into frames innerText misses.
        if let Ok(html) = driver.page_html().await {
            page_text = extract::html_to_text(&html);
        }
    }
    let class = extract::classify_outcome(&page_text, profile);
    let reference = extract::find_booking_reference(&page_text);
    let final_url = driver.current_url().await.ok();

    let (outcome, message) = match class {
        OutcomeClass::Success => (BookingOutcome::Success, "Booking confirmed".to_string()),
        OutcomeClass::Failure => (
            BookingOutcome::Failure,
            "Booking failed: failure indicator on page".to_string(),
        ),
        OutcomeClass::Ambiguous => (
            BookingOutcome::Unclear,
            "Booking outcome unclear: page shows both success and failure indicators".to_string(),
        ),
        OutcomeClass::Unknown => (
            BookingOutcome::Unclear,
            "Booking outcome unclear: no confirmation indicator found".to_string(),
        ),
    };
    // An unclear page travels with the result so the caller can judge it.
    let page_excerpt = (outcome == BookingOutcome::Unclear)
        .then(|| page_text.chars().take(2000).collect::<String>());

    Ok(BookingResult {
        success: outcome == BookingOutcome::Success,
        outcome,
        message,
        test_mode: false,
        booking_reference: reference,
        final_url,
        page_excerpt,
        completed_at: Utc::now(),
    })
}

async fn resolve_hint_cascade<'a, B: BrowserTrait>(
    resolver: &ElementResolver<'a, B>,
    scope: &Scope,
    intent: &str,
    selectors: &[String],
) -> Result<Option<crate::resolver::Resolution>> {
    let strategies: Vec<Strategy> = selectors
        .iter()
        .map(|s| Strategy::Hint { selector: s.clone() })
        .collect();
    resolver.resolve(scope, intent, &strategies).await
}

async fn fill_required<'a, B: BrowserTrait>(
    resolver: &ElementResolver<'a, B>,
    executor: &ActionExecutor<'a, B>,
    scope: &Scope,
    intent: &str,
    selectors: &[String],
    value: &str,
) -> Result<()> {
    match resolve_hint_cascade(resolver, scope, intent, selectors).await? {
        Some(resolution) => {
            executor
                .perform(
                    &resolution.token,
                    ActionKind::Fill(value.to_string()),
                    Verification::None,
                )
                .await?;
            Ok(())
        }
        None => Err(BookingError::HardResolutionFailure {
            stage: "personal-data".to_string(),
            intent: intent.to_string(),
            attempted: selectors.iter().map(|s| format!("hint({s})")).collect(),
        }),
    }
}

async fn fill_optional<'a, B: BrowserTrait>(
    resolver: &ElementResolver<'a, B>,
    executor: &ActionExecutor<'a, B>,
    scope: &Scope,
    intent: &str,
    selectors: &[String],
    value: &str,
) -> Result<bool> {
    match resolve_hint_cascade(resolver, scope, intent, selectors).await? {
        Some(resolution) => {
            executor
                .perform(
                    &resolution.token,
                    ActionKind::Fill(value.to_string()),
                    Verification::None,
                )
                .await?;
            Ok(true)
        }
        None => {
            warn!(intent, "field not found, skipping");
            Ok(false)
        }
    }
}

async fn check_optional<'a, B: BrowserTrait>(
    resolver: &ElementResolver<'a, B>,
    executor: &ActionExecutor<'a, B>,
    scope: &Scope,
    intent: &str,
    selectors: &[String],
) -> Result<bool> {
    match resolve_hint_cascade(resolver, scope, intent, selectors).await? {
        Some(resolution) => {
            executor
                .perform(&resolution.token, ActionKind::Check, Verification::None)
                .await?;
            Ok(true)
        }
        None => {
            warn!(intent, "checkbox not found, skipping");
            Ok(false)
        }
    }
}
