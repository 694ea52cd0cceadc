//! Expense Attachment Model

use serde::{Deserialize, Serialize};

/// File attached to a medical expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ExpenseAttachment {
    pub id: i64,
    pub depense_medicale_id: i64,
    /// Blob store path (`depenses-attachments/<uuid>.<ext>`)
    pub chemin_fichier: String,
    /// Original client file name
    pub nom_fichier: String,
    pub type_mime: Option<String>,
    /// Size in bytes
    pub taille_fichier: i64,
    pub description: Option<String>,
    pub created_at: i64,
}

/// Uploaded file as received from the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub original_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}
