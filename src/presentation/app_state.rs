// Application state for HTTP handlers
use crate::application::forecast_service::ForecastService;

pub struct AppState {
    pub forecast_service: ForecastService,
}
