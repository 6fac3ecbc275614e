use crate::booking::consent::AvailabilityWait;
use crate::booking::flow;
use crate::booking::model::{
    BookingData, BookingOutcome, BookingResult, Hotel, PersonalData, Room, SearchParams,
    SelectedRoom,
};
use crate::booking::profile::SiteProfile;
use crate::booking::stage::Stage;
use crate::booking::url::build_search_url;
use crate::browser::PageDriver;
use crate::core::{BrowserTrait, Config};
use crate::errors::{BookingError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// One guest's booking attempt: a dedicated browser, a stage cursor, and
/// everything learned along the way.
///
/// All stage operations guard on the current stage first, so calling them
/// out of order (or twice) is rejected before any page interaction happens.
pub struct BookingSession<B: BrowserTrait> {
    pub id: String,
    pub stage: Stage,
    pub created_at: DateTime<Utc>,
    last_touched: Instant,
    pub hotel: Hotel,
    pub search_params: SearchParams,
    pub test_mode: bool,
    pub rooms: Vec<Room>,
    pub selected_room: Option<SelectedRoom>,
    pub personal_data: Option<PersonalData>,
    config: Arc<Config>,
    profile: SiteProfile,
    browser: Option<B>,
    tab: Option<B::TabHandle>,
}

impl<B: BrowserTrait> std::fmt::Debug for BookingSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingSession")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("created_at", &self.created_at)
            .field("hotel", &self.hotel)
            .field("search_params", &self.search_params)
            .field("test_mode", &self.test_mode)
            .field("rooms", &self.rooms)
            .field("selected_room", &self.selected_room)
            .field("personal_data", &self.personal_data)
            .finish_non_exhaustive()
    }
}

impl<B: BrowserTrait> BookingSession<B> {
    pub fn new(
        id: String,
        hotel: Hotel,
        search_params: SearchParams,
        config: Arc<Config>,
        profile: SiteProfile,
        test_mode: bool,
    ) -> Self {
        Self {
            id,
            stage: Stage::Search,
            created_at: Utc::now(),
            last_touched: Instant::now(),
            hotel,
            search_params,
            test_mode,
            rooms: Vec::new(),
            selected_room: None,
            personal_data: None,
            config,
            profile,
            browser: None,
            tab: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.idle_for() >= Duration::from_secs(self.config.session.idle_expiry_secs)
    }

    fn driver(&self) -> Result<PageDriver<'_, B>> {
        let browser = self.browser.as_ref().ok_or(BookingError::BrowserNotLaunched)?;
        let tab = self.tab.as_ref().ok_or(BookingError::NoActiveTab)?;
        Ok(PageDriver::new(browser, tab))
    }

    /// Launch a browser, open the availability page and extract the rooms.
    /// On success the session moves to room selection.
    pub async fn start_search(&mut self, mut browser: B) -> Result<&[Room]> {
        self.stage.require(Stage::Search)?;
        self.touch();

        browser.launch(&self.config.browser).await?;
        let tab = browser.new_tab().await?;
        self.browser = Some(browser);
        self.tab = Some(tab);

        let url = build_search_url(&self.hotel.base_url, &self.search_params);
        info!(session = %self.id, %url, "starting availability search");

        let result = self.run_search(&url).await;
        match result {
            Ok(wait) => {
                if wait == AvailabilityWait::TimeoutButProceed {
                    warn!(session = %self.id, "results wait timed out, extracted what was there");
                }
                self.stage = Stage::RoomSelection;
                info!(session = %self.id, rooms = self.rooms.len(), "search complete");
                self.capture_screenshot("room-selection").await;
                Ok(&self.rooms)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn run_search(&mut self, url: &str) -> Result<AvailabilityWait> {
        let driver = self.driver()?;
        let wait = flow::open_results(
            &driver,
            &self.config.session,
            &self.config.resolver,
            &self.profile,
            url,
        )
        .await?;
        let rooms = crate::booking::extract::extract_rooms(&driver, &self.profile).await?;
        self.rooms = rooms;
        Ok(wait)
    }

    /// Rooms on the results page. While the session is still at room
    /// selection this re-extracts from the live page, so rates that streamed
    /// in after the search show up; past that stage the list from selection
    /// time is returned as-is.
    pub async fn available_rooms(&mut self) -> Result<&[Room]> {
        if self.stage == Stage::Search {
            return Err(BookingError::SessionStateViolation {
                expected: Stage::RoomSelection.as_str().to_string(),
                actual: self.stage.as_str().to_string(),
            });
        }
        if self.stage == Stage::RoomSelection {
            self.ensure_browser_alive().await?;
            self.touch();
            let refreshed = {
                let driver = self.driver()?;
                crate::booking::extract::extract_rooms(&driver, &self.profile).await
            };
            match refreshed {
                Ok(rooms) => self.rooms = rooms,
                Err(e) => return Err(self.fail(e).await),
            }
        }
        Ok(&self.rooms)
    }

    /// Click the book button for `room_id` (optionally a specific rate) and
    /// advance to the guest-data stage.
    pub async fn select_room(
        &mut self,
        room_id: &str,
        option_id: Option<&str>,
    ) -> Result<(SelectedRoom, bool)> {
        self.stage.require(Stage::RoomSelection)?;
        self.ensure_browser_alive().await?;
        self.touch();

        let room = self
            .rooms
            .iter()
            .find(|r| r.id == room_id)
            .cloned()
            .ok_or_else(|| BookingError::RoomNotFound(room_id.to_string()))?;
        let option = match option_id {
            Some(oid) => Some(
                room.booking_options
                    .iter()
                    .find(|o| o.id == oid)
                    .cloned()
                    .ok_or_else(|| BookingError::RoomNotFound(oid.to_string()))?,
            ),
            None => None,
        };

        let advance = {
            let driver = self.driver()?;
            flow::select_room(
                &driver,
                &self.config.resolver,
                &self.profile,
                &room,
                option.as_ref(),
            )
            .await
        };

        match advance {
            Ok(advance) => {
                if !advance.outcome.is_confirmed() {
                    // Unconfirmed clicks still advance: the guest-data stage
                    // re-checks its own markers before touching the page.
                    warn!(session = %self.id, "room selection unconfirmed, advancing anyway");
                }
                let selected = SelectedRoom {
                    room_id: room.id.clone(),
                    room_name: room.name.clone(),
                    room_price: option.as_ref().and_then(|o| o.price).or(room.price),
                    option_id: option.map(|o| o.id),
                    selector: Some(advance.via.clone()),
                };
                self.selected_room = Some(selected.clone());
                self.stage = Stage::PersonalData;
                self.capture_screenshot("personal-data").await;
                Ok((selected, advance.on_customer_data_page))
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Fill the guest-data form and advance to payment.
    pub async fn fill_personal_data(&mut self, data: &PersonalData) -> Result<()> {
        self.stage.require(Stage::PersonalData)?;
        self.ensure_browser_alive().await?;
        self.touch();

        let result = {
            let driver = self.driver()?;
            flow::fill_personal_data(&driver, &self.config.resolver, &self.profile, data).await
        };
        match result {
            Ok(outcome) => {
                if !outcome.is_confirmed() {
                    warn!(session = %self.id, "continue click unconfirmed, advancing anyway");
                }
                self.personal_data = Some(data.clone());
                self.stage = Stage::Payment;
                self.capture_screenshot("payment").await;
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Run the payment stage. A test-mode run fills the form, stops before
    /// submit and leaves the session at the payment stage so it can be
    /// inspected; a live run ends the session either way.
    pub async fn complete_booking(
        &mut self,
        data: &BookingData,
        test_mode: bool,
    ) -> Result<BookingResult> {
        self.stage.require(Stage::Payment)?;
        self.ensure_browser_alive().await?;
        self.touch();

        let effective_test = test_mode || self.test_mode;
        let result = {
            let driver = self.driver()?;
            flow::complete_booking(
                &driver,
                &self.config.resolver,
                &self.profile,
                data,
                effective_test,
            )
            .await
        };
        match result {
            Ok(result) => {
                if !result.test_mode {
                    match result.outcome {
                        BookingOutcome::Success => {
                            self.stage = Stage::Completed;
                            self.capture_screenshot(self.stage.as_str()).await;
                            self.release().await;
                        }
                        BookingOutcome::Failure => {
                            self.stage = Stage::Failed;
                            self.capture_screenshot(self.stage.as_str()).await;
                            self.release().await;
                        }
                        // Not a verdict: the session stays at payment with
                        // its browser so an operator can inspect the page.
                        BookingOutcome::Unclear => {
                            warn!(session = %self.id, "booking outcome unclear, keeping session open");
                            self.capture_screenshot("unclear").await;
                        }
                    }
                }
                Ok(result)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Release the browser exactly once; later calls are no-ops.
    pub async fn release(&mut self) {
        self.tab.take();
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(session = %self.id, error = %e, "browser close failed");
            }
        }
    }

    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// A browser process that died out from under the session cannot be
    /// recovered; fail the session and release what is left.
    async fn ensure_browser_alive(&mut self) -> Result<()> {
        let alive = self.browser.as_ref().map(|b| b.is_running()).unwrap_or(false);
        if alive {
            Ok(())
        } else {
            Err(self
                .fail(BookingError::ResourceFailure(
                    "browser process is no longer running".to_string(),
                ))
                .await)
        }
    }

    async fn fail(&mut self, e: BookingError) -> BookingError {
        if is_fatal(&e) {
            error!(session = %self.id, error = %e, "session failed");
            self.capture_screenshot("failure").await;
            self.stage = Stage::Failed;
            self.release().await;
        }
        e
    }

    /// Best-effort diagnostic screenshot; only when a directory is
    /// configured and the tab is still alive. Never masks the caller's
    /// error.
    async fn capture_screenshot(&self, label: &str) {
        let Some(dir) = &self.config.session.screenshot_dir else {
            return;
        };
        let Ok(driver) = self.driver() else {
            return;
        };
        if let Ok(png) = driver.screenshot().await {
            if png.is_empty() {
                return;
            }
            let path = dir.join(format!("{}-{}.png", self.id, label));
            match tokio::fs::write(&path, png).await {
                Ok(()) => info!(session = %self.id, path = %path.display(), "screenshot saved"),
                Err(e) => warn!(session = %self.id, error = %e, "screenshot write failed"),
            }
        }
    }
}

/// Errors that end the session. Guard violations and bad input leave the
/// stage where it was so the caller can retry with a corrected request.
fn is_fatal(e: &BookingError) -> bool {
    !matches!(
        e,
        BookingError::SessionStateViolation { .. }
            | BookingError::SessionNotFound(_)
            | BookingError::InvalidRequest(_)
            | BookingError::RoomNotFound(_)
    )
}
