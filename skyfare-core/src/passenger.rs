use serde::{Deserialize, Serialize};

use crate::phone::{normalize_phone, PhoneDefaults};

/// Passenger as submitted by the booking client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerInput {
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 date, e.g. "1990-04-21".
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub passport_expiry: Option<String>,
    #[serde(default)]
    pub passport_country: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

/// Travel document in the booking platform's shape. The platform only
/// accepts passports on this flow, so the type is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub unique_identifier: String,
    pub expires_on: Option<String>,
    pub issuing_country_code: Option<String>,
    #[serde(rename = "type")]
    pub document_type: String,
}

/// Passenger in the booking platform's shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    pub given_name: String,
    pub family_name: String,
    pub born_on: String,
    pub gender: String,
    pub email: String,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub passenger_type: String,
    pub nationality: Option<String>,
    #[serde(default)]
    pub identity_documents: Vec<IdentityDocument>,
}

/// Collapse client gender values to the platform's single-letter codes.
/// Unrecognized values map to "x" (unspecified) rather than passing garbage
/// through to the platform.
pub fn normalize_gender(raw: Option<&str>) -> String {
    match raw.map(|g| g.trim().to_lowercase()) {
        Some(g) if g == "male" => "m".to_string(),
        Some(g) if g == "female" => "f".to_string(),
        Some(g) if g.len() == 1 => g,
        _ => "x".to_string(),
    }
}

impl PassengerInput {
    /// Map the client shape onto the platform shape, normalizing contact and
    /// document fields. Performed once per request; nothing is stored.
    pub fn to_traveler(&self, phone_defaults: &PhoneDefaults) -> Traveler {
        let identity_documents = match &self.passport_number {
            Some(number) if !number.is_empty() => vec![IdentityDocument {
                unique_identifier: number.clone(),
                expires_on: self.passport_expiry.clone(),
                issuing_country_code: self.passport_country.clone(),
                document_type: "passport".to_string(),
            }],
            _ => Vec::new(),
        };

        Traveler {
            given_name: self.first_name.clone(),
            family_name: self.last_name.clone(),
            born_on: self.date_of_birth.clone(),
            gender: normalize_gender(self.gender.as_deref()),
            email: self.email.clone(),
            phone_number: normalize_phone(&self.phone, phone_defaults),
            passenger_type: "adult".to_string(),
            nationality: self.nationality.clone(),
            identity_documents,
        }
    }
}
