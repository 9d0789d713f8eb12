//! The narrow interface to the external category/currency directory.
//!
//! The directory lives outside the core, typically behind a REST catalog.
//! The ledger never holds a live reference to its data: category
//! details are frozen into a [`CategorySnapshot`] at insert time, so ledger
//! operations work whether or not the directory is reachable, and an
//! abandoned lookup leaves no partial ledger or cache state behind.

use uuid::Uuid;

use crate::{CategorySnapshot, CategoryType};

/// Category identity/display data as the directory serves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub image_path: Option<String>,
    pub color: Option<i32>,
    pub category_type: CategoryType,
}

/// Currency display data as the directory serves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyRecord {
    pub code: String,
    pub display_name: String,
    pub flag_ref: String,
}

/// Lookup surface the core consumes. Implementations may suspend on
/// network I/O; the ledger itself never awaits them inside a write.
#[allow(async_fn_in_trait)]
pub trait Directory {
    async fn category(&self, user_id: &str, id: Uuid) -> Option<CategoryRecord>;
    async fn currency(&self, code: &str) -> Option<CurrencyRecord>;
}

impl From<&CategoryRecord> for CategorySnapshot {
    fn from(record: &CategoryRecord) -> Self {
        CategorySnapshot::new(
            record.name.clone(),
            record.icon.clone(),
            record.image_path.clone(),
            record.color,
            record.category_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_freezes_directory_record() {
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            name: "Rent".to_string(),
            icon: "home".to_string(),
            image_path: None,
            color: Some(0x336699),
            category_type: CategoryType::Necessity,
        };

        let snapshot = CategorySnapshot::from(&record);
        assert_eq!(snapshot.name, "Rent");
        assert_eq!(snapshot.type_label, "Necesidad");
        assert_eq!(snapshot.category_type, CategoryType::Necessity);
    }
}
