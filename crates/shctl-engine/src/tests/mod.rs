//! Behavioural test suites for the mutation engine.

mod engine_behaviour;
