//! # Label Template Repository
//!
//! Read-only access to label sheet templates. Templates are seeded by
//! migration and shared by all users.

use sqlx::SqlitePool;
use wherehouse_core::LabelTemplate;

use crate::error::{DbError, DbResult};

const TEMPLATE_COLUMNS: &str = "id, name, template_name, page_width, page_height, \
     labels_per_row, labels_per_column, label_width, label_height, horizontal_spacing, \
     vertical_spacing, left_margin, top_margin, is_default, created_at";

#[derive(Debug, Clone)]
pub struct LabelTemplateRepository {
    pool: SqlitePool,
}

impl LabelTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LabelTemplateRepository { pool }
    }

    /// All templates, default first.
    pub async fn list(&self) -> DbResult<Vec<LabelTemplate>> {
        let templates = sqlx::query_as::<_, LabelTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM label_templates ORDER BY is_default DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    pub async fn get(&self, id: i64) -> DbResult<LabelTemplate> {
        sqlx::query_as::<_, LabelTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM label_templates WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Label template", id))
    }

    /// The template flagged as default (lowest id if several are).
    pub async fn get_default(&self) -> DbResult<LabelTemplate> {
        sqlx::query_as::<_, LabelTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM label_templates
             WHERE is_default = 1
             ORDER BY id
             LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Label template", "default"))
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_seeded_default_template() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let labels = db.labels();

        let default = labels.get_default().await.unwrap();
        assert_eq!(default.template_name, "Avery18260");
        assert!(default.is_default);
        assert_eq!(default.labels_per_row, 3);
        assert_eq!(default.labels_per_column, 10);
        assert_eq!(default.labels_per_sheet(), 30);
        assert_eq!(default.label_width, 2.625);
        assert_eq!(default.left_margin, 0.1875);

        assert_eq!(labels.list().await.unwrap(), vec![default.clone()]);
        assert_eq!(labels.get(default.id).await.unwrap(), default);
        assert!(labels.get(default.id + 1).await.unwrap_err().is_not_found());
    }
}
