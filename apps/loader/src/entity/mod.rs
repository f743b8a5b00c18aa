//! SeaORM entity definitions.

pub mod defect;
pub mod defect_job;
pub mod defect_test_case;
pub mod job_run;
pub mod test_case;
pub mod test_job;
pub mod test_suite;
