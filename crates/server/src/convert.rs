//! Mapping between wire shapes and engine types.

use api_types::{
    ObligationStatus as WireObligationStatus, SessionStatus as WireSessionStatus, payment,
    player, session,
};
use chrono::{DateTime, FixedOffset, Utc};
use engine::{
    ObligationStatus, PaymentMethod, PlayerSessionFilter, RoleFilter, SessionSort, SessionStatus,
    SortOrder,
};

pub fn session_status(status: WireSessionStatus) -> SessionStatus {
    match status {
        WireSessionStatus::Draft => SessionStatus::Draft,
        WireSessionStatus::ProcessingFaces => SessionStatus::ProcessingFaces,
        WireSessionStatus::ReadyToSplit => SessionStatus::ReadyToSplit,
        WireSessionStatus::SplitConfirmed => SessionStatus::SplitConfirmed,
        WireSessionStatus::Closed => SessionStatus::Closed,
    }
}

pub fn wire_session_status(status: SessionStatus) -> WireSessionStatus {
    match status {
        SessionStatus::Draft => WireSessionStatus::Draft,
        SessionStatus::ProcessingFaces => WireSessionStatus::ProcessingFaces,
        SessionStatus::ReadyToSplit => WireSessionStatus::ReadyToSplit,
        SessionStatus::SplitConfirmed => WireSessionStatus::SplitConfirmed,
        SessionStatus::Closed => WireSessionStatus::Closed,
    }
}

pub fn obligation_status(status: WireObligationStatus) -> ObligationStatus {
    match status {
        WireObligationStatus::Pending => ObligationStatus::Pending,
        WireObligationStatus::MarkedPaid => ObligationStatus::MarkedPaid,
        WireObligationStatus::Verified => ObligationStatus::Verified,
        WireObligationStatus::Rejected => ObligationStatus::Rejected,
    }
}

pub fn wire_obligation_status(status: ObligationStatus) -> WireObligationStatus {
    match status {
        ObligationStatus::Pending => WireObligationStatus::Pending,
        ObligationStatus::MarkedPaid => WireObligationStatus::MarkedPaid,
        ObligationStatus::Verified => WireObligationStatus::Verified,
        ObligationStatus::Rejected => WireObligationStatus::Rejected,
    }
}

pub fn role_filter(role: session::RoleFilter) -> RoleFilter {
    match role {
        session::RoleFilter::Host => RoleFilter::Host,
        session::RoleFilter::Player => RoleFilter::Player,
        session::RoleFilter::All => RoleFilter::All,
    }
}

pub fn session_sort(sort: session::SessionSort) -> SessionSort {
    match sort {
        session::SessionSort::Date => SessionSort::Date,
        session::SessionSort::CreatedAt => SessionSort::CreatedAt,
        session::SessionSort::Name => SessionSort::Name,
    }
}

pub fn sort_order(order: session::SortOrder) -> SortOrder {
    match order {
        session::SortOrder::Asc => SortOrder::Asc,
        session::SortOrder::Desc => SortOrder::Desc,
    }
}

pub fn payment_method(method: payment::PaymentMethod) -> PaymentMethod {
    match method {
        payment::PaymentMethod::Cash => PaymentMethod::Cash,
        payment::PaymentMethod::Transfer => PaymentMethod::Transfer,
        payment::PaymentMethod::Ewallet => PaymentMethod::Ewallet,
        payment::PaymentMethod::Other => PaymentMethod::Other,
    }
}

pub fn player_session_filter(filter: player::SessionFilter) -> PlayerSessionFilter {
    match filter {
        player::SessionFilter::All => PlayerSessionFilter::All,
        player::SessionFilter::Pending => PlayerSessionFilter::Pending,
        player::SessionFilter::Paid => PlayerSessionFilter::Paid,
        player::SessionFilter::Verified => PlayerSessionFilter::Verified,
    }
}

pub fn utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}
