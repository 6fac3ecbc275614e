pub mod consent;
pub mod extract;
pub mod flow;
pub mod model;
pub mod profile;
pub mod session;
pub mod stage;
pub mod store;
pub mod url;

pub use model::{
    BookingData, BookingOption, BookingOutcome, BookingResult, CancellationPolicy, Hotel,
    PersonalData, Room, SearchParams, SelectedRoom,
};
pub use profile::SiteProfile;
pub use session::BookingSession;
pub use stage::Stage;
pub use store::SessionStore;
