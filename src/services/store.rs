// src/services/store.rs
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Property, PropertyAnalysis};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to (de)serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for properties and their analyses.
///
/// Saving a record without an id creates a new document and returns the
/// generated id; saving one with an id overwrites that document.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn save_property(&self, property: &Property) -> Result<String, StoreError>;
    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, StoreError>;
    async fn list_properties(&self, limit: usize) -> Result<Vec<Property>, StoreError>;
    async fn delete_property(&self, property_id: &str) -> Result<bool, StoreError>;

    async fn save_analysis(&self, analysis: &PropertyAnalysis) -> Result<String, StoreError>;
    async fn get_analysis(&self, analysis_id: &str) -> Result<Option<PropertyAnalysis>, StoreError>;
    /// Newest analysis first.
    async fn get_analyses_for_property(&self, property_id: &str) -> Result<Vec<PropertyAnalysis>, StoreError>;
}

pub(crate) fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Process-local store, used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    properties: RwLock<HashMap<String, Property>>,
    analyses: RwLock<HashMap<String, PropertyAnalysis>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn save_property(&self, property: &Property) -> Result<String, StoreError> {
        let mut properties = self.properties.write().await;
        let id = property.property_id.clone().unwrap_or_else(new_document_id);
        let now = Utc::now();

        let mut stored = property.clone();
        stored.property_id = Some(id.clone());
        stored.created_at = properties
            .get(&id)
            .and_then(|existing| existing.created_at)
            .or(Some(now));
        stored.updated_at = Some(now);

        properties.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, StoreError> {
        Ok(self.properties.read().await.get(property_id).cloned())
    }

    async fn list_properties(&self, limit: usize) -> Result<Vec<Property>, StoreError> {
        let properties = self.properties.read().await;
        let mut listed: Vec<Property> = properties.values().cloned().collect();
        listed.sort_by_key(|p| p.created_at);
        listed.truncate(limit);
        Ok(listed)
    }

    async fn delete_property(&self, property_id: &str) -> Result<bool, StoreError> {
        Ok(self.properties.write().await.remove(property_id).is_some())
    }

    async fn save_analysis(&self, analysis: &PropertyAnalysis) -> Result<String, StoreError> {
        let id = analysis.analysis_id.clone().unwrap_or_else(new_document_id);
        let mut stored = analysis.clone();
        stored.analysis_id = Some(id.clone());
        stored.created_at = Some(Utc::now());

        self.analyses.write().await.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get_analysis(&self, analysis_id: &str) -> Result<Option<PropertyAnalysis>, StoreError> {
        Ok(self.analyses.read().await.get(analysis_id).cloned())
    }

    async fn get_analyses_for_property(&self, property_id: &str) -> Result<Vec<PropertyAnalysis>, StoreError> {
        let analyses = self.analyses.read().await;
        let mut matching: Vec<PropertyAnalysis> = analyses
            .values()
            .filter(|a| a.property_id == property_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.analysis_date.cmp(&a.analysis_date));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialAssumptions, PropertyType};
    use crate::services::analyzer::calculate_property_analysis;
    use chrono::Duration;

    fn property(address: &str) -> Property {
        Property {
            address: address.to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip_code: "78701".to_string(),
            purchase_price: 350_000.0,
            property_type: PropertyType::Condo,
            bedrooms: 2,
            bathrooms: 1.5,
            square_feet: 1100,
            year_built: 2012,
            lot_size: None,
            listing_url: None,
            mls_number: Some("MLS-42".to_string()),
            property_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn save_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let id = store.save_property(&property("1 Elm St")).await.unwrap();

        let saved = store.get_property(&id).await.unwrap().unwrap();
        assert_eq!(saved.property_id.as_deref(), Some(id.as_str()));
        assert!(saved.created_at.is_some());
        assert!(saved.updated_at.is_some());
        assert!(store.get_property("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_with_id_overwrites_and_keeps_created_at() {
        let store = MemoryStore::new();
        let id = store.save_property(&property("1 Elm St")).await.unwrap();
        let first = store.get_property(&id).await.unwrap().unwrap();

        let mut updated = first.clone();
        updated.purchase_price = 360_000.0;
        let same_id = store.save_property(&updated).await.unwrap();
        assert_eq!(same_id, id);

        let second = store.get_property(&id).await.unwrap().unwrap();
        assert_eq!(second.purchase_price, 360_000.0);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.list_properties(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_respects_limit_and_delete_removes() {
        let store = MemoryStore::new();
        let first = store.save_property(&property("1 Elm St")).await.unwrap();
        store.save_property(&property("2 Elm St")).await.unwrap();
        store.save_property(&property("3 Elm St")).await.unwrap();

        assert_eq!(store.list_properties(2).await.unwrap().len(), 2);
        assert_eq!(store.list_properties(100).await.unwrap().len(), 3);

        assert!(store.delete_property(&first).await.unwrap());
        assert!(!store.delete_property(&first).await.unwrap());
        assert_eq!(store.list_properties(100).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn analyses_are_returned_newest_first() {
        let store = MemoryStore::new();
        let mut subject = property("1 Elm St");
        subject.property_id = Some("prop-1".to_string());

        let mut older = calculate_property_analysis(&subject, &FinancialAssumptions::default());
        older.analysis_date = older.analysis_date - Duration::days(1);
        let newer = calculate_property_analysis(&subject, &FinancialAssumptions::default());
        let other = calculate_property_analysis(&property("9 Oak St"), &FinancialAssumptions::default());

        let older_id = store.save_analysis(&older).await.unwrap();
        let newer_id = store.save_analysis(&newer).await.unwrap();
        store.save_analysis(&other).await.unwrap();

        let analyses = store.get_analyses_for_property("prop-1").await.unwrap();
        let ids: Vec<_> = analyses.iter().filter_map(|a| a.analysis_id.clone()).collect();
        assert_eq!(ids, vec![newer_id.clone(), older_id]);

        let fetched = store.get_analysis(&newer_id).await.unwrap().unwrap();
        assert!(fetched.created_at.is_some());
    }
}
