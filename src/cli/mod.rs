pub mod check;
pub mod ledger;
