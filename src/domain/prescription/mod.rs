//! Prescription domain

mod entity;
mod repository;

pub use entity::{
    NewPrescription, Prescription, PrescriptionFilter, PrescriptionStatus, PrescriptionUpdate,
};
pub use repository::PrescriptionRepository;
