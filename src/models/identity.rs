use serde::Serialize;

/// A registered person whose face may be matched for attendance.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String, // normalized, unique
    #[serde(skip)]
    pub reference_image: Option<Vec<u8>>,
    pub created_at: String, // RFC 3339 in the deployment timezone
}

impl Identity {
    pub fn has_reference(&self) -> bool {
        self.reference_image
            .as_deref()
            .is_some_and(|img| !img.is_empty())
    }
}
