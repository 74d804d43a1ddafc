//! In-memory prescription list
//!
//! Holds mock data only. Nothing is persisted and the list resets on restart.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::prescription::{
    NewPrescription, Prescription, PrescriptionFilter, PrescriptionRepository,
    PrescriptionStatus, PrescriptionUpdate,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryPrescriptionRepository {
    prescriptions: Arc<RwLock<Vec<Prescription>>>,
}

impl InMemoryPrescriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prescriptions(prescriptions: Vec<Prescription>) -> Self {
        Self {
            prescriptions: Arc::new(RwLock::new(prescriptions)),
        }
    }

    /// Repository pre-filled with the sample prescriptions
    pub fn seeded() -> Self {
        Self::with_prescriptions(sample_prescriptions())
    }
}

#[async_trait]
impl PrescriptionRepository for InMemoryPrescriptionRepository {
    async fn list(&self, filter: &PrescriptionFilter) -> Result<Vec<Prescription>, DomainError> {
        let prescriptions = self.prescriptions.read().await;

        Ok(prescriptions
            .iter()
            .filter(|rx| filter.matches(rx))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Prescription>, DomainError> {
        let prescriptions = self.prescriptions.read().await;
        Ok(prescriptions.iter().find(|rx| rx.id == id).cloned())
    }

    async fn create(&self, request: NewPrescription) -> Result<Prescription, DomainError> {
        request.validate()?;

        let prescription = request.into_prescription(uuid::Uuid::new_v4().to_string());
        self.prescriptions.write().await.push(prescription.clone());

        Ok(prescription)
    }

    async fn update(
        &self,
        id: &str,
        update: PrescriptionUpdate,
    ) -> Result<Option<Prescription>, DomainError> {
        update.validate()?;

        let mut prescriptions = self.prescriptions.write().await;

        Ok(prescriptions.iter_mut().find(|rx| rx.id == id).map(|rx| {
            rx.apply(update);
            rx.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<Option<Prescription>, DomainError> {
        let mut prescriptions = self.prescriptions.write().await;

        let position = prescriptions.iter().position(|rx| rx.id == id);
        Ok(position.map(|i| prescriptions.remove(i)))
    }
}

fn sample_prescriptions() -> Vec<Prescription> {
    let now = Utc::now();

    vec![
        Prescription {
            id: "1".to_string(),
            patient_id: "patient-1".to_string(),
            doctor_id: "doctor-1".to_string(),
            medication_name: "Sertraline".to_string(),
            dosage: "50mg".to_string(),
            frequency: "Once daily".to_string(),
            duration: "30 days".to_string(),
            instructions: Some("Take in the morning with food".to_string()),
            status: PrescriptionStatus::Active,
            prescribed_date: now - Duration::days(3),
        },
        Prescription {
            id: "2".to_string(),
            patient_id: "patient-1".to_string(),
            doctor_id: "doctor-1".to_string(),
            medication_name: "Melatonin".to_string(),
            dosage: "3mg".to_string(),
            frequency: "Nightly".to_string(),
            duration: "14 days".to_string(),
            instructions: Some("Take 30 minutes before bed".to_string()),
            status: PrescriptionStatus::Completed,
            prescribed_date: now - Duration::days(40),
        },
        Prescription {
            id: "3".to_string(),
            patient_id: "patient-2".to_string(),
            doctor_id: "doctor-2".to_string(),
            medication_name: "Bupropion".to_string(),
            dosage: "150mg".to_string(),
            frequency: "Twice daily".to_string(),
            duration: "60 days".to_string(),
            instructions: None,
            status: PrescriptionStatus::Discontinued,
            prescribed_date: now - Duration::days(90),
        },
    ]
}
