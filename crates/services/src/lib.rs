#![forbid(unsafe_code)]

pub mod app_services;
pub mod dashboard_service;
pub mod dispatcher;
pub mod error;
pub mod generation;

pub use buddy_core::Clock;

pub use app_services::AppServices;
pub use dashboard_service::{DashboardOverview, DashboardService};
pub use dispatcher::{Ack, AiReply, BackgroundDispatcher, PanelSignal, Request, Response};
pub use error::{
    AppServicesError, DashboardError, DispatchError, GenerationError, MISSING_CREDENTIAL_MESSAGE,
};
pub use generation::{GeminiConfig, GeminiGateway, GenerationGateway, PromptIntent};
