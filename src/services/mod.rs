//! Domain services: thin consumers of the shared [`crate::api::ApiClient`].
//!
//! Each service supplies only its endpoint paths and typed models. Token
//! handling, the refresh-on-401 protocol, and the single transparent retry
//! all live in the client; nothing here repeats them.

pub mod assignments;
pub mod attendance;
pub mod headquarters;
pub mod institutions;
pub mod justifications;

pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use headquarters::HeadquartersService;
pub use institutions::InstitutionService;
pub use justifications::JustificationService;
