use std::sync::Arc;

use skyfare_booking::ConfirmationWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ConfirmationWorkflow>,
}
