//! Domain models for the school-management API.
//!
//! Field names follow the backend's camelCase JSON; structs stay close to
//! the wire shape so the services can hand them straight to callers.

pub mod attendance;
pub mod headquarters;
pub mod institution;
pub mod justification;
pub mod staff;

pub use attendance::{AttendanceEntry, AttendanceSheet, AttendanceStatus};
pub use headquarters::{Headquarters, NewHeadquarters};
pub use institution::{Institution, NewInstitution};
pub use justification::{Justification, JustificationStatus, NewJustification};
pub use staff::{NewStaffAssignment, StaffAssignment};
