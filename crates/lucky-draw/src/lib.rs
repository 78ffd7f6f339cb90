//! Backend for the year-end lucky draw: prize lookup by name and company, the sign-in company
//! dropdown, the sign-in log, and admin roster uploads.

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod roster;
pub mod service;
pub mod signups;
pub mod storage;
pub mod telemetry;
pub mod winners;

pub use http::draw_router;
pub use service::DrawService;
