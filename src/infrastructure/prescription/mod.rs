//! Prescription infrastructure module

mod in_memory;

pub use in_memory::InMemoryPrescriptionRepository;
