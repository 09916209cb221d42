pub mod lifecycle;
pub mod prescription;
pub mod store;

pub use lifecycle::ConsultationLifecycleService;
pub use prescription::PrescriptionWorkflow;
pub use store::ConsultationStore;
