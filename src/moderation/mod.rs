//! Moderation core: match → record → enforce, one cycle at a time.

pub mod enforcer;
pub mod ledger;
pub mod matcher;
pub mod poller;
pub mod report;
pub mod scheduler;

pub use enforcer::Enforcer;
pub use ledger::{EscalationDecision, ViolationLedger, ViolationRecord};
pub use matcher::{Matcher, PatternMatch};
pub use poller::{PollSettings, Poller};
pub use report::{CycleError, CycleReport, FailedOp};
pub use scheduler::{Scheduler, SchedulerState};
