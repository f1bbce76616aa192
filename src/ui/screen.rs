use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::data_table::render_data_table;

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Summary and charts for the current filter, rendered by the App widget
pub struct DashboardScreen;

impl Screen for DashboardScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Table of every stored attempt
pub struct DataScreen;

impl Screen for DataScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_data_table(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Dashboard => Box::new(DashboardScreen),
        AppState::Data => Box::new(DataScreen),
    }
}
