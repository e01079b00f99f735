//! Billing
//!
//! - [`events`] - per-order fee events consumed by invoice generation
//! - [`service_events`] - per-item outbound service events

pub mod events;
pub mod service_events;

pub use events::{
    list_billing_events, remove_billing_event, sync_inbound_order_billing_event,
    sync_outbound_order_billing_event,
};
pub use service_events::{soft_delete_outbound_service_event, upsert_outbound_service_event};
