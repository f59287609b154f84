//! Session & obligation settlement engine.
//!
//! A host records a shared-cost session, itemizes expenses, splits the total
//! among the non-host participants and follows every resulting obligation
//! until it is verified. All state lives in a relational store reached
//! through sea-orm; each [`Engine`] operation runs inside one database
//! transaction.

pub use commands::{
    NewExpenseCmd, NewPlayerCmd, NewSessionCmd, PlayerSessionFilter, ReportPaymentCmd,
    RoleFilter, SessionListQuery, SessionSort, SortOrder, UpdateExpenseCmd, UpdateProfileCmd,
    UpdateSessionCmd, VerifyDecision,
};
pub use error::{EngineError, ErrorKind};
pub use expense_items::ExpenseItem;
pub use ledger::ExpenseLedger;
pub use obligations::{Obligation, ObligationAction, ObligationStatus};
pub use ops::{Engine, EngineBuilder};
pub use participants::{Participant, ParticipantRole};
pub use payment_proofs::{PaymentProof, ProofStatus};
pub use payments::{Payment, PaymentMethod};
pub use players::Player;
pub use roster::{KeepRoster, RosterConfirmer};
pub use sessions::{Session, SessionStatus, SessionTransition};
pub use split::{SplitCalculator, SplitPlan};
pub use users::User;
pub use views::{
    ExpenseSummary, HostSummary, ObligationEntry, ObligationList, ParticipantStatus,
    PayerSummary, PaymentStatusView, PaymentSummary, PlayerObligationDetail,
    PlayerObligationItem, PlayerObligationTotals, PlayerObligations, PlayerSessionItem,
    SessionDetail, SessionListItem, SessionPage, SettlementSummary, SplitOutcome, StatusCounts,
    UserProfile,
};

mod commands;
mod error;
pub mod expense_items;
mod ledger;
pub mod obligations;
mod ops;
pub mod participants;
pub mod payment_proofs;
pub mod payments;
pub mod players;
mod roster;
pub mod sessions;
mod split;
pub mod users;
mod util;
mod views;

type ResultEngine<T> = Result<T, EngineError>;
