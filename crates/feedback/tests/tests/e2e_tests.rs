#[path = "e2e/feedback_cycle.rs"]
mod feedback_cycle;

#[path = "e2e/retraining_gate.rs"]
mod retraining_gate;
