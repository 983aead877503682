use sqlx::{error::ErrorKind, PgPool};

/// Applies the embedded schema migrations.
pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}

/// Name of the violated unique constraint, if that is what `err` is.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    let db_err = err.as_database_error()?;
    match db_err.kind() {
        ErrorKind::UniqueViolation => Some(db_err.constraint().unwrap_or_default()),
        _ => None,
    }
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| matches!(e.kind(), ErrorKind::ForeignKeyViolation))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_violations() {
        let err = sqlx::Error::RowNotFound;
        assert!(unique_violation(&err).is_none());
        assert!(!is_foreign_key_violation(&err));
    }
}
