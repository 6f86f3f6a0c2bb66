//! SQL identifier quoting for the configurable version table name.

/// Quote a single SQL identifier, doubling embedded double quotes.
///
/// # Examples
/// ```
/// use dbp_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("db_version"), r#""db_version""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified name part by part.
///
/// # Examples
/// ```
/// use dbp_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("ops.db_version"), r#""ops"."db_version""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Name of the sequence that feeds the version table's identity column.
///
/// The sequence lives in the same schema as the table.
pub fn identity_sequence_name(table: &str) -> String {
    format!("{table}_id_seq")
}
