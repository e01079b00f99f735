//! Status transitions
//!
//! Whether a status change touches the ledger depends only on applied
//! membership before and after; any status may follow any other.

use shared::models::{InboundStatus, OutboundStatus};

/// Ledger effect of a header update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTransition {
    /// Not applied before, applied after
    Apply,
    /// Applied before, not applied after
    Rollback,
    /// Applied before and after: only billing needs a refresh
    Resync,
    /// Not applied before or after
    Idle,
}

impl LedgerTransition {
    pub fn between(was_applied: bool, will_apply: bool) -> Self {
        match (was_applied, will_apply) {
            (false, true) => LedgerTransition::Apply,
            (true, false) => LedgerTransition::Rollback,
            (true, true) => LedgerTransition::Resync,
            (false, false) => LedgerTransition::Idle,
        }
    }
}

/// Audit action name of an inbound header update
pub fn inbound_action(from: InboundStatus, to: InboundStatus) -> &'static str {
    if from == to {
        return "update";
    }
    match to {
        InboundStatus::Submitted => "submit",
        InboundStatus::Arrived => "arrive",
        InboundStatus::Received => "receive",
        InboundStatus::Cancelled => "cancel",
        InboundStatus::Draft | InboundStatus::QcHold => "status_change",
    }
}

/// Audit action name of an outbound header update
pub fn outbound_action(from: OutboundStatus, to: OutboundStatus) -> &'static str {
    if from == to {
        return "update";
    }
    match to {
        OutboundStatus::Allocated => "allocate",
        OutboundStatus::Packed => "pack",
        OutboundStatus::Shipped => "ship",
        OutboundStatus::Delivered => "deliver",
        OutboundStatus::Cancelled => "cancel",
        OutboundStatus::Draft
        | OutboundStatus::Confirmed
        | OutboundStatus::Picking
        | OutboundStatus::Packing => "status_change",
    }
}
