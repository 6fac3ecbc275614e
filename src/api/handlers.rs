use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::booking::{BookingData, BookingSession, Hotel, PersonalData, SearchParams};
use crate::core::BrowserTrait;
use crate::errors::BookingError;
use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

type ApiResult = Result<Json<Value>, ApiError>;

/// A session whose browser died cannot serve anything further; evict it so
/// the id stops answering instead of returning conflicts until the idle
/// sweep. Callers must have dropped their session guard already, the store
/// locks it again to release the browser.
async fn evict_on_resource_failure<B: BrowserTrait, T>(
    state: &AppState<B>,
    session_id: &str,
    result: crate::errors::Result<T>,
) -> Result<T, ApiError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            if matches!(e, BookingError::ResourceFailure(_)) {
                info!(session = %session_id, "evicting session with dead browser");
                let _ = state.store.remove(session_id).await;
            }
            Err(ApiError(e))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSearchRequest {
    pub hotel: Hotel,
    #[serde(flatten)]
    pub params: SearchParams,
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRoomRequest {
    pub session_id: String,
    pub room_id: String,
    #[serde(default)]
    pub option_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillPersonalDataRequest {
    pub session_id: String,
    pub personal_data: PersonalData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBookingRequest {
    pub session_id: String,
    #[serde(default)]
    pub booking_data: Option<BookingData>,
    #[serde(default)]
    pub test_mode: bool,
}

fn validate_search(params: &SearchParams) -> Result<(), BookingError> {
    for (label, value) in [
        ("checkinDate", &params.checkin_date),
        ("checkoutDate", &params.checkout_date),
    ] {
        if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
            return Err(BookingError::InvalidRequest(format!(
                "{label} must be a YYYY-MM-DD date, got '{value}'"
            )));
        }
    }
    if params.checkout_date <= params.checkin_date {
        return Err(BookingError::InvalidRequest(
            "checkoutDate must be after checkinDate".to_string(),
        ));
    }
    if params.adults == 0 {
        return Err(BookingError::InvalidRequest(
            "adults must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub async fn start_search<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Json(req): Json<StartSearchRequest>,
) -> ApiResult {
    validate_search(&req.params)?;
    if req.hotel.base_url.is_empty() {
        return Err(BookingError::InvalidRequest("hotel.baseUrl is required".to_string()).into());
    }

    let session_id = Uuid::new_v4().to_string();
    info!(session = %session_id, hotel = %req.hotel.name, "session created");

    let session = BookingSession::new(
        session_id.clone(),
        req.hotel,
        req.params,
        state.config.clone(),
        state.profile.clone(),
        req.test_mode,
    );
    let handle = state.store.insert(session);
    let browser = (state.browser_factory)();

    let mut session = handle.lock().await;
    let result = session.start_search(browser).await.map(|r| r.to_vec());
    let stage = session.stage;
    drop(session);
    let rooms = evict_on_resource_failure(&state, &session_id, result).await?;

    Ok(Json(json!({
        "success": true,
        "sessionId": session_id,
        "message": format!("Search complete, {} room(s) found", rooms.len()),
        "data": {
            "success": true,
            "status": stage.as_str(),
            "message": "Availability results extracted",
            "rooms": rooms,
        },
    })))
}

pub async fn available_rooms<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let handle = state.store.get(&session_id)?;
    let mut session = handle.lock().await;
    let result = session.available_rooms().await.map(|r| r.to_vec());
    drop(session);
    let rooms = evict_on_resource_failure(&state, &session_id, result).await?;
    Ok(Json(json!({
        "success": true,
        "rooms": rooms,
        "message": format!("{} room(s) available", rooms.len()),
    })))
}

pub async fn select_room<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Json(req): Json<SelectRoomRequest>,
) -> ApiResult {
    let handle = state.store.get(&req.session_id)?;
    let mut session = handle.lock().await;
    let result = session
        .select_room(&req.room_id, req.option_id.as_deref())
        .await;
    drop(session);
    let (selected, on_customer_data_page) =
        evict_on_resource_failure(&state, &req.session_id, result).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Room '{}' selected", selected.room_name),
        "data": {
            "roomId": selected.room_id,
            "roomName": selected.room_name,
            "roomPrice": selected.room_price,
            "selector": selected.selector,
            "onCustomerDataPage": on_customer_data_page,
        },
    })))
}

pub async fn fill_personal_data<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Json(req): Json<FillPersonalDataRequest>,
) -> ApiResult {
    if req.personal_data.email.is_empty() {
        return Err(
            BookingError::InvalidRequest("personalData.email is required".to_string()).into(),
        );
    }
    let handle = state.store.get(&req.session_id)?;
    let mut session = handle.lock().await;
    let result = session.fill_personal_data(&req.personal_data).await;
    let stage = session.stage;
    drop(session);
    evict_on_resource_failure(&state, &req.session_id, result).await?;
    Ok(Json(json!({
        "success": true,
        "sessionId": req.session_id,
        "message": "Personal data submitted",
        "currentStep": stage.as_str(),
        "nextAction": "complete-booking",
    })))
}

pub async fn complete_booking<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Json(req): Json<CompleteBookingRequest>,
) -> ApiResult {
    let handle = state.store.get(&req.session_id)?;
    let mut session = handle.lock().await;
    let data = req.booking_data.unwrap_or_default();
    let result = session.complete_booking(&data, req.test_mode).await;
    drop(session);
    let result = evict_on_resource_failure(&state, &req.session_id, result).await?;
    let test_mode = result.test_mode;
    let message = result.message.clone();
    Ok(Json(json!({
        "success": result.success,
        "sessionId": req.session_id,
        "result": result,
        "message": message,
        "testMode": test_mode,
    })))
}

pub async fn session_status<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let handle = state.store.get(&session_id)?;
    let session = handle.lock().await;
    Ok(Json(json!({
        "sessionId": session.id,
        "currentStep": session.stage.as_str(),
        "createdAt": session.created_at,
        "searchParams": session.search_params,
        "availableRooms": session.rooms.len(),
        "selectedRoom": session.selected_room,
    })))
}

pub async fn delete_session<B: BrowserTrait>(
    State(state): State<AppState<B>>,
    Path(session_id): Path<String>,
) -> ApiResult {
    state.store.remove(&session_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Session {session_id} closed"),
    })))
}

pub async fn health<B: BrowserTrait>(State(state): State<AppState<B>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "activeSessions": state.store.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(checkin: &str, checkout: &str, adults: u32) -> SearchParams {
        SearchParams {
            checkin_date: checkin.to_string(),
            checkout_date: checkout.to_string(),
            adults,
            children: 0,
        }
    }

    #[test]
    fn accepts_well_formed_search() {
        assert!(validate_search(&params("2026-09-01", "2026-09-04", 2)).is_ok());
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = validate_search(&params("01/09/2026", "2026-09-04", 2)).unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));
        assert!(err.to_string().contains("checkinDate"));
    }

    #[test]
    fn rejects_checkout_before_checkin() {
        let err = validate_search(&params("2026-09-04", "2026-09-01", 2)).unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));
    }

    #[test]
    fn rejects_zero_adults() {
        assert!(validate_search(&params("2026-09-01", "2026-09-04", 0)).is_err());
    }

    #[test]
    fn start_search_request_parses_flattened_params() {
        let json = r#"{
            "hotel": {"id": "h1", "name": "Hotel Mare", "baseUrl": "https://book.example/h1"},
            "checkinDate": "2026-09-01",
            "checkoutDate": "2026-09-04",
            "adults": 2,
            "children": 1,
            "testMode": true
        }"#;
        let req: StartSearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.params.checkin_date, "2026-09-01");
        assert_eq!(req.params.children, 1);
        assert!(req.test_mode);
        assert_eq!(req.hotel.base_url, "https://book.example/h1");
    }
}
