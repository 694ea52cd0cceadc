//! Business services
//!
//! Each operation takes the shared [`ServerState`](crate::core::ServerState)
//! and the caller's [`RequestContext`], checks authorization through the
//! guards, validates input into field-level messages and only then writes.

pub mod dues;
pub mod expenses;
pub mod localites;
pub mod members;
pub mod roles;
pub mod users;

use crate::auth::Actor;
use crate::db::repository::localite;
use crate::reports::{LocalityFilter, ReportFilters};
use crate::storage::extension_of;
use crate::utils::validation::parse_period_filter;
use crate::utils::{AppError, AppResult};
use shared::error::ErrorCode;
use shared::i18n::Locale;
use shared::models::AttachmentUpload;
use sqlx::SqlitePool;

/// Who is calling and in which language messages should be written
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: Actor,
    pub locale: Locale,
}

impl RequestContext {
    pub fn new(actor: Actor, locale: Locale) -> Self {
        Self { actor, locale }
    }

    pub fn user_id(&self) -> i64 {
        self.actor.user_id
    }
}

/// Validated report filters, with the locality label resolved
pub(crate) async fn resolve_report_filters(
    pool: &SqlitePool,
    ctx: &RequestContext,
    membre_id: Option<i64>,
    localite_id: Option<i64>,
    annee: Option<&str>,
    mois: Option<&str>,
) -> AppResult<ReportFilters> {
    let (year, month) = parse_period_filter(ctx.locale, annee, mois)
        .map_err(|errors| AppError::invalid_fields(&errors))?;
    let locality = match localite_id {
        Some(id) => {
            let found = localite::find_by_id(pool, id).await?.ok_or_else(|| {
                AppError::with_message(ErrorCode::LocaliteNotFound, format!("Locality {id} not found"))
            })?;
            Some(LocalityFilter {
                id: found.id,
                label: found.libelle,
            })
        }
        None => None,
    };
    Ok(ReportFilters {
        membre_id,
        locality,
        year,
        month,
    })
}

/// Check an uploaded file against the accepted extensions and size limit
pub(crate) fn check_upload(
    locale: Locale,
    field: &str,
    upload: &AttachmentUpload,
    accepted: &[&str],
    max_bytes: u64,
) -> AppResult<()> {
    if upload.bytes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile).with_detail("field", field));
    }
    let supported = extension_of(&upload.original_name)
        .is_some_and(|ext| accepted.contains(&ext.as_str()));
    if !supported {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            locale.unsupported_file(field, &accepted.join(", ")),
        )
        .with_detail("field", field));
    }
    if upload.bytes.len() as u64 > max_bytes {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            locale.file_too_large(field, max_bytes / 1024),
        )
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, size: usize) -> AttachmentUpload {
        AttachmentUpload {
            original_name: name.into(),
            mime: None,
            bytes: vec![1; size],
        }
    }

    #[test]
    fn test_check_upload() {
        let accepted = ["jpg", "png"];
        assert!(check_upload(Locale::Fr, "photo", &upload("a.JPG", 10), &accepted, 100).is_ok());

        let err = check_upload(Locale::Fr, "photo", &upload("a.gif", 10), &accepted, 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
        assert_eq!(err.message, "Le fichier photo doit être de type : jpg, png.");

        let err = check_upload(Locale::Fr, "photo", &upload("a.png", 101), &accepted, 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);

        let err = check_upload(Locale::Fr, "photo", &upload("a.png", 0), &accepted, 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyFile);
    }
}
