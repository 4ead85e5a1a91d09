use crate::query::{FilterField, FilterParameters};

/// Accepted values of [`ServiceFilter::mode`].
pub const SERVICE_MODES: &[&str] = &["replicated", "global"];

/// Filters for `GET /services`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    /// Service id or id prefix.
    pub id: String,
    /// Label, as `key` or `key=value`.
    pub label: String,
    /// Scheduling mode: `replicated`, `global` or empty.
    pub mode: String,
    /// Service name or name prefix.
    pub name: String,
}

impl FilterParameters for ServiceFilter {
    fn filter_fields(&self) -> Vec<FilterField<'_>> {
        vec![
            FilterField::new("Id", &self.id),
            FilterField::new("Label", &self.label),
            FilterField::one_of("Mode", &self.mode, SERVICE_MODES),
            FilterField::new("Name", &self.name),
        ]
    }
}
