pub mod cancel;
pub mod request_id;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use request_id::generate_request_id;
