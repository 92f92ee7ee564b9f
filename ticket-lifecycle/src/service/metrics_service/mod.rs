mod dto;
mod metrics_service;
mod metrics_service_impl;

pub use dto::{Operation, Outcome};
pub use metrics_service::*;
pub use metrics_service_impl::*;
