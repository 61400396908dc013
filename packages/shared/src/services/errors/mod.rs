pub mod challenge_service_errors;
pub mod ledger_service_errors;
pub mod player_service_errors;
