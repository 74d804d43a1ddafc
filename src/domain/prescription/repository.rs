//! Prescription repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewPrescription, Prescription, PrescriptionFilter, PrescriptionUpdate};
use crate::domain::DomainError;

#[async_trait]
pub trait PrescriptionRepository: Send + Sync + Debug {
    async fn list(&self, filter: &PrescriptionFilter) -> Result<Vec<Prescription>, DomainError>;

    async fn get(&self, id: &str) -> Result<Option<Prescription>, DomainError>;

    async fn create(&self, request: NewPrescription) -> Result<Prescription, DomainError>;

    async fn update(
        &self,
        id: &str,
        update: PrescriptionUpdate,
    ) -> Result<Option<Prescription>, DomainError>;

    async fn delete(&self, id: &str) -> Result<Option<Prescription>, DomainError>;
}
