//! File actions module.
//!
//! Deletion of planned duplicates, either to the system trash (default,
//! recoverable) or permanently.
//!
//! ```no_run
//! use dupsweep::actions::{execute_plan, DeleteConfig, FsDeleter};
//! use dupsweep::duplicates::DeletionPlan;
//!
//! let plan = DeletionPlan::default();
//! let result = execute_plan(&plan, &FsDeleter::new(DeleteConfig::trash()), None);
//! assert_eq!(result.total_count(), 0);
//! ```

pub mod delete;

pub use delete::{
    delete_to_trash, execute_plan, permanent_delete, validate_plan, verify_size,
    BatchDeleteResult, DeleteConfig, DeleteError, DeleteProgressCallback, DeleteResult, Deleter,
    FsDeleter,
};
