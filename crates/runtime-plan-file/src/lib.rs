mod runtime;

pub use runtime::{PLAN_FILE, PlanFileRuntime, SUMMARY_FILE};
