//! HTTP API module for the workshop engine.
//!
//! This module exposes month layout, pay period resolution, payroll
//! calculation and payment confirmation as REST endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ConfirmRequest, LayoutRequest, PayrollRequest, PeriodQuery, PeriodSelector,
    ScheduledItemRequest,
};
pub use response::{ApiError, ApiErrorResponse, CalculationResponse, PeriodResponse};
pub use state::AppState;
