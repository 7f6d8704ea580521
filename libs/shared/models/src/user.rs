use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Unassigned,
    Patient,
    Doctor,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Unassigned => write!(f, "UNASSIGNED"),
            UserRole::Patient => write!(f, "PATIENT"),
            UserRole::Doctor => write!(f, "DOCTOR"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "PENDING"),
            VerificationStatus::Verified => write!(f, "VERIFIED"),
            VerificationStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Row of the `users` table.
///
/// `credits` is a cached balance: it always equals the sum of the user's
/// `credit_transactions` because both are written by the same database call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub auth_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub role: UserRole,
    pub credits: i32,
    pub plan_id: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i32>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
    pub verification_status: Option<VerificationStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn is_verified_doctor(&self) -> bool {
        self.role == UserRole::Doctor
            && self.verification_status == Some(VerificationStatus::Verified)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Public view of a doctor, safe to return from unauthenticated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i32>,
    pub description: Option<String>,
    pub verification_status: Option<VerificationStatus>,
}

impl From<UserRecord> for DoctorProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image_url: user.image_url,
            specialty: user.specialty,
            experience: user.experience,
            description: user.description,
            verification_status: user.verification_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_postgrest_row() {
        let row = json!({
            "id": "7f1d8a9e-3c1b-4a5e-9a43-0d2b2c6f1e10",
            "auth_id": "user_2abc",
            "email": "vet@example.com",
            "name": "Dr. Paws",
            "image_url": null,
            "role": "DOCTOR",
            "credits": 4,
            "plan_id": null,
            "specialty": "Dermatology",
            "experience": 7,
            "credential_url": "https://example.com/license.pdf",
            "description": "Skin and coat issues",
            "verification_status": "VERIFIED",
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00"
        });

        let user: UserRecord = serde_json::from_value(row).unwrap();
        assert!(user.is_verified_doctor());
        assert_eq!(user.display_name(), "Dr. Paws");
    }
}
