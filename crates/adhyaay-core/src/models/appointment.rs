use serde::Serialize;

/// Payload for `POST /appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub junior_name: String,
    pub junior_email: String,
    pub semester: String,
    pub description: String,
    /// Mentor id.
    pub mentor: String,
    /// Midnight UTC of the chosen day, `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case() {
        let req = AppointmentRequest {
            junior_name: "Asha".to_string(),
            junior_email: "asha@example.com".to_string(),
            semester: "3".to_string(),
            description: "Exam stress".to_string(),
            mentor: "m1".to_string(),
            date: "2025-03-14T00:00:00.000Z".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).expect("serializable"),
            json!({
                "juniorName": "Asha",
                "juniorEmail": "asha@example.com",
                "semester": "3",
                "description": "Exam stress",
                "mentor": "m1",
                "date": "2025-03-14T00:00:00.000Z",
            })
        );
    }
}
