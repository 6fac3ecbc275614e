pub mod chrome;
pub mod driver;
pub mod navigation;

pub use chrome::ChromeBrowser;
pub use driver::{CandidateElement, ElementProbe, PageDriver};
pub use navigation::wait_for_dom_ready;
