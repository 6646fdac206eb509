use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePart {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    pub user_id: i64,
}

/// Fields a user submits when creating or editing a spare part.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpareFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl SpareFields {
    /// Trimmed copy, or `None` when any field is blank.
    pub fn complete(&self) -> Option<SpareFields> {
        let trimmed = SpareFields {
            name: self.name.trim().to_string(),
            manufacturer: self.manufacturer.trim().to_string(),
            category: self.category.trim().to_string(),
            unit: self.unit.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        let all_present = [
            &trimmed.name,
            &trimmed.manufacturer,
            &trimmed.category,
            &trimmed.unit,
            &trimmed.description,
        ]
        .iter()
        .all(|f| !f.is_empty());
        all_present.then_some(trimmed)
    }
}

impl From<&SparePart> for SpareFields {
    fn from(spare: &SparePart) -> Self {
        Self {
            name: spare.name.clone(),
            manufacturer: spare.manufacturer.clone(),
            category: spare.category.clone(),
            unit: spare.unit.clone(),
            description: spare.description.clone(),
        }
    }
}

/// Public JSON shape of a spare part.
#[derive(Debug, Clone, Serialize)]
pub struct SpareJson {
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "Category")]
    pub category: String,
    pub unit: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl From<SparePart> for SpareJson {
    fn from(spare: SparePart) -> Self {
        Self {
            id: spare.id,
            name: spare.name,
            manufacturer: spare.manufacturer,
            category: spare.category,
            unit: spare.unit,
            description: spare.description,
        }
    }
}
