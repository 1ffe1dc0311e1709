//! Catalog read handlers for the admin surface and the public engine.

use serde::Serialize;
use std::sync::Arc;

use crate::application::handlers::lookup::{require_tree, require_type};
use crate::domain::catalog::{
    AssessmentType, AssessmentVersion, LightSubset, VersionTotals, VersionTree,
};
use crate::domain::foundation::{DomainError, TypeId, VersionId};
use crate::ports::CatalogRepository;

/// A type in the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct TypeOverview {
    #[serde(flatten)]
    pub assessment_type: AssessmentType,
    pub published_label: Option<String>,
    pub version_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionOverview {
    pub version: AssessmentVersion,
    pub totals: VersionTotals,
}

/// A type with all its versions, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDetail {
    pub assessment_type: AssessmentType,
    pub versions: Vec<VersionOverview>,
}

/// Query handler over the catalog.
pub struct CatalogQueries {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogQueries {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn list_types(&self) -> Result<Vec<TypeOverview>, DomainError> {
        let types = self.catalog.list_types().await?;
        let mut overviews = Vec::with_capacity(types.len());
        for assessment_type in types {
            let versions = self.catalog.list_versions(assessment_type.id).await?;
            overviews.push(TypeOverview {
                published_label: versions
                    .iter()
                    .find(|v| v.is_published())
                    .map(|v| v.label().to_string()),
                version_count: versions.len(),
                assessment_type,
            });
        }
        Ok(overviews)
    }

    pub async fn type_detail(&self, type_id: TypeId) -> Result<TypeDetail, DomainError> {
        let assessment_type = require_type(self.catalog.as_ref(), type_id).await?;
        let mut versions = Vec::new();
        for version in self.catalog.list_versions(type_id).await? {
            let totals = require_tree(self.catalog.as_ref(), version.id())
                .await?
                .totals();
            versions.push(VersionOverview { version, totals });
        }
        Ok(TypeDetail {
            assessment_type,
            versions,
        })
    }

    pub async fn version_tree(&self, version_id: VersionId) -> Result<VersionTree, DomainError> {
        require_tree(self.catalog.as_ref(), version_id).await
    }

    pub async fn published(
        &self,
        type_id: TypeId,
    ) -> Result<Option<AssessmentVersion>, DomainError> {
        self.catalog.find_published(type_id).await
    }

    /// Light questions of a version, grouped by domain.
    pub async fn light_subset(&self, version_id: VersionId) -> Result<LightSubset, DomainError> {
        Ok(require_tree(self.catalog.as_ref(), version_id)
            .await?
            .light_subset())
    }
}
