//! Placeholder conventions.

/// The placeholder marker a statement is rendered with.
///
/// Every builder takes the style explicitly; nothing in the crate consults
/// ambient state to decide how parameters are spelled. Both styles use a
/// single repeated marker, so the Nth marker in the text always binds the
/// Nth value in the parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `?`, as used by SQLite and ODBC drivers.
    #[default]
    Qmark,
    /// `%s`, as used by several PostgreSQL and MySQL client libraries.
    Format,
}

impl PlaceholderStyle {
    /// The marker text substituted for each bound value.
    pub fn marker(self) -> &'static str {
        match self {
            PlaceholderStyle::Qmark => "?",
            PlaceholderStyle::Format => "%s",
        }
    }
}
