use std::sync::Arc;

use crate::config::FormDefaults;
use crate::dashboard::DashboardController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardController>,
    pub form_defaults: Arc<FormDefaults>,
}

impl AppState {
    pub fn new(controller: Arc<DashboardController>, form_defaults: FormDefaults) -> Self {
        Self {
            controller,
            form_defaults: Arc::new(form_defaults),
        }
    }
}
