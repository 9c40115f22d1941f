use std::sync::Arc;

use crate::recovery::PasswordRecovery;
use crate::store::SharedStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: SharedStore,
    pub recovery: PasswordRecovery,
}
