//! Library document listing and upload

use super::Repository;
use crate::config::StorageConfig;
use crate::db::models::*;
use crate::dto::*;
use crate::errors::{AppError, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
};
use std::collections::HashMap;

fn library_item(doc: &LibraryDocument, contractor_name: Option<String>, storage: &StorageConfig) -> LibraryItem {
    LibraryItem {
        id: doc.id,
        contractor_id: doc.contractor_id,
        contractor_name,
        theme: doc.theme.clone(),
        title: doc.title.clone(),
        description: doc.description.clone(),
        year: doc.year,
        country: doc.country.clone(),
        is_confidential: doc.is_confidential,
        file_url: (!doc.is_confidential).then(|| storage.library_url(&doc.file_name)),
        submitted_at: doc.submitted_at,
    }
}

impl Repository {
    pub async fn list_library(
        &self,
        filter: &LibraryFilter,
        storage: &StorageConfig,
    ) -> Result<Vec<LibraryItem>> {
        let mut query = LibraryDocumentEntity::find();

        if let Some(id) = filter.contractor_id {
            query = query.filter(LibraryDocumentColumn::ContractorId.eq(id));
        }
        if let Some(ref theme) = filter.theme {
            query = query.filter(LibraryDocumentColumn::Theme.eq(theme.as_str()));
        }
        if let Some(year) = filter.year {
            query = query.filter(LibraryDocumentColumn::Year.eq(year));
        }
        if let Some(ref country) = filter.country {
            query = query.filter(LibraryDocumentColumn::Country.eq(country.as_str()));
        }

        let docs = query
            .order_by_desc(LibraryDocumentColumn::Year)
            .order_by_asc(LibraryDocumentColumn::Id)
            .all(self.read_conn())
            .await?;

        let contractor_ids: Vec<i32> = docs.iter().map(|d| d.contractor_id).collect();
        let names: HashMap<i32, String> = self
            .rows_in::<ContractorEntity>(ContractorColumn::Id, &contractor_ids, ContractorColumn::Id)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(docs
            .iter()
            .map(|doc| library_item(doc, names.get(&doc.contractor_id).cloned(), storage))
            .collect())
    }

    /// Contractors that have submitted at least one document
    pub async fn library_contractors(&self) -> Result<Vec<LookupOption>> {
        let contractors = ContractorEntity::find()
            .filter(
                ContractorColumn::Id.in_subquery(
                    LibraryDocumentEntity::find()
                        .select_only()
                        .column(LibraryDocumentColumn::ContractorId)
                        .into_query(),
                ),
            )
            .order_by_asc(ContractorColumn::Name)
            .all(self.read_conn())
            .await?;

        Ok(contractors.iter().map(LookupOption::from).collect())
    }

    pub async fn library_themes(&self) -> Result<Vec<String>> {
        LibraryDocumentEntity::find()
            .select_only()
            .column(LibraryDocumentColumn::Theme)
            .distinct()
            .order_by_asc(LibraryDocumentColumn::Theme)
            .into_tuple::<String>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Record an uploaded document's metadata
    pub async fn create_library_document(
        &self,
        request: &LibraryUploadRequest,
        storage: &StorageConfig,
    ) -> Result<LibraryItem> {
        let contractor = self
            .find_contractor(request.contractor_id)
            .await?
            .ok_or(AppError::ContractorNotFound { id: request.contractor_id })?;

        let doc = LibraryDocumentActiveModel {
            contractor_id: Set(contractor.id),
            theme: Set(request.theme.trim().to_string()),
            title: Set(request.title.trim().to_string()),
            description: Set(request.description.clone()),
            year: Set(request.year),
            country: Set(request.country.clone()),
            is_confidential: Set(request.is_confidential),
            file_name: Set(request.file_name.clone()),
            submitted_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(self.write_conn())
        .await?;

        tracing::info!(
            document_id = doc.id,
            contractor_id = doc.contractor_id,
            confidential = doc.is_confidential,
            "Library document recorded"
        );

        Ok(library_item(&doc, Some(contractor.name), storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::seeded_pool;

    async fn repo() -> Repository {
        Repository::new(seeded_pool().await)
    }

    fn upload(contractor_id: i32, confidential: bool) -> LibraryUploadRequest {
        LibraryUploadRequest {
            contractor_id,
            theme: "Resource Assessment".into(),
            title: "Ashadze field grade estimate".into(),
            description: None,
            year: 2023,
            country: Some("Russian Federation".into()),
            is_confidential: confidential,
            file_name: "ashadze_grades_2023.pdf".into(),
        }
    }

    #[tokio::test]
    async fn test_confidential_documents_have_no_url() {
        let repo = repo().await;
        let storage = StorageConfig::default();

        let items = repo
            .list_library(&LibraryFilter { contractor_id: Some(2), ..Default::default() }, &storage)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);

        let confidential = items.iter().find(|i| i.is_confidential).unwrap();
        assert!(confidential.file_url.is_none());
        let public = items.iter().find(|i| !i.is_confidential).unwrap();
        assert!(public.file_url.as_deref().unwrap().ends_with("/library/comra_env_baseline_2018.pdf"));
    }

    #[tokio::test]
    async fn test_upload_records_document() {
        let repo = repo().await;
        let storage = StorageConfig::default();

        let created = repo.create_library_document(&upload(6, false), &storage).await.unwrap();
        assert_eq!(created.contractor_name.as_deref(), Some("Government of the Russian Federation"));
        assert!(created.file_url.is_some());
        assert!(created.id > 5);

        let themes = repo.library_themes().await.unwrap();
        assert!(themes.contains(&"Resource Assessment".to_string()));
    }

    #[tokio::test]
    async fn test_upload_for_unknown_contractor_is_rejected() {
        let repo = repo().await;
        let err = repo
            .create_library_document(&upload(99, false), &StorageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ContractorNotFound { id: 99 }));
    }

    #[tokio::test]
    async fn test_library_contractors_only_lists_submitters() {
        let repo = repo().await;
        let ids: Vec<i32> = repo.library_contractors().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(!ids.contains(&1));
    }
}
