/// Integration test target
mod basic_integration;
mod backup_round_trip;
