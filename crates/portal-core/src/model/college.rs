use crate::primitives::DEFAULT_COLLEGE_LOCATION;
use crate::types::{CollegeId, PortalError};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A college, keyed for uniqueness by its academic domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: CollegeId,
    pub name: String,
    pub domain: String,
    pub location: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// College creation draft.
#[derive(Debug, Clone, Default)]
pub struct NewCollege {
    pub name: String,
    pub domain: String,
    pub location: Option<String>,
    pub verified: bool,
}

impl NewCollege {
    pub fn into_college(self, now: DateTime<Utc>) -> Result<College, PortalError> {
        let location = validation::optional_text("location", self.location.as_deref())?
            .unwrap_or_else(|| DEFAULT_COLLEGE_LOCATION.to_string());
        Ok(College {
            id: CollegeId::generate(),
            name: validation::required_text("College name", &self.name)?,
            domain: validation::college_domain(&self.domain)?,
            location,
            verified: self.verified,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_defaults_to_india() {
        let college = NewCollege {
            name: "GLA University".to_string(),
            domain: "GLA.ac.in".to_string(),
            ..NewCollege::default()
        }
        .into_college(Utc::now())
        .expect("valid");

        assert_eq!(college.location, "India");
        assert_eq!(college.domain, "gla.ac.in");
        assert!(!college.verified);
    }

    #[test]
    fn missing_name_is_rejected() {
        let result = NewCollege {
            name: "  ".to_string(),
            domain: "iitb.ac.in".to_string(),
            ..NewCollege::default()
        }
        .into_college(Utc::now());
        assert_eq!(
            result,
            Err(PortalError::Validation("College name is required".to_string()))
        );
    }
}
