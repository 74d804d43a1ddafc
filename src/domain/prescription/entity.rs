//! Prescription entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Lifecycle state of a prescription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    #[default]
    Active,
    Completed,
    Discontinued,
}

/// A medication order written by a doctor for a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub status: PrescriptionStatus,
    pub prescribed_date: DateTime<Utc>,
}

/// Fields required to write a new prescription
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub patient_id: String,
    pub doctor_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub status: Option<PrescriptionStatus>,
}

impl NewPrescription {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("patientId", &self.patient_id),
            ("doctorId", &self.doctor_id),
            ("medicationName", &self.medication_name),
            ("dosage", &self.dosage),
            ("frequency", &self.frequency),
            ("duration", &self.duration),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("'{}' is required", field)));
            }
        }

        Ok(())
    }

    /// Build the stored prescription, stamping id and date
    pub fn into_prescription(self, id: impl Into<String>) -> Prescription {
        Prescription {
            id: id.into(),
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            medication_name: self.medication_name,
            dosage: self.dosage,
            frequency: self.frequency,
            duration: self.duration,
            instructions: self.instructions,
            status: self.status.unwrap_or_default(),
            prescribed_date: Utc::now(),
        }
    }
}

/// Partial update of a prescription
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionUpdate {
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    pub status: Option<PrescriptionStatus>,
}

impl PrescriptionUpdate {
    /// Fields that are required on create may be changed but not blanked
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("medicationName", &self.medication_name),
            ("dosage", &self.dosage),
            ("frequency", &self.frequency),
            ("duration", &self.duration),
        ];

        for (field, value) in required {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(DomainError::validation(format!("'{}' cannot be blank", field)));
            }
        }

        Ok(())
    }
}

impl Prescription {
    pub fn apply(&mut self, update: PrescriptionUpdate) {
        if let Some(v) = update.medication_name {
            self.medication_name = v;
        }
        if let Some(v) = update.dosage {
            self.dosage = v;
        }
        if let Some(v) = update.frequency {
            self.frequency = v;
        }
        if let Some(v) = update.duration {
            self.duration = v;
        }
        if let Some(v) = update.instructions {
            self.instructions = Some(v);
        }
        if let Some(v) = update.status {
            self.status = v;
        }
    }
}

/// Query filter for listing prescriptions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionFilter {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<PrescriptionStatus>,
}

impl PrescriptionFilter {
    pub fn matches(&self, rx: &Prescription) -> bool {
        self.patient_id.as_ref().is_none_or(|p| &rx.patient_id == p)
            && self.doctor_id.as_ref().is_none_or(|d| &rx.doctor_id == d)
            && self.status.is_none_or(|s| rx.status == s)
    }
}
