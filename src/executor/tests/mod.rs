pub mod helpers;

mod add_validator_test;
