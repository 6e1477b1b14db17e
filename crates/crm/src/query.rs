//! OData query options and relationship links

/// `$filter`/`$select`/`$top`/`$orderby` options for a retrieve-multiple request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    filter: Option<String>,
    select: Vec<String>,
    top: Option<u32>,
    order_by: Option<String>,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw filter expression; combined with `and` when called repeatedly
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        self.filter = Some(match self.filter.take() {
            Some(existing) => format!("{} and {}", existing, expression),
            None => expression,
        });
        self
    }

    /// `field eq 'value'` with the value quoted
    pub fn filter_eq(self, field: &str, value: &str) -> Self {
        self.filter(format!("{} eq {}", field, quote(value)))
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        let direction = if descending { "desc" } else { "asc" };
        self.order_by = Some(format!("{} {}", field, direction));
        self
    }

    pub fn filter_expression(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Query pairs ready for `RequestBuilder::query`
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("$filter".to_string(), filter.clone()));
        }
        if !self.select.is_empty() {
            pairs.push(("$select".to_string(), self.select.join(",")));
        }
        if let Some(top) = self.top {
            pairs.push(("$top".to_string(), top.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("$orderby".to_string(), order_by.clone()));
        }
        pairs
    }
}

/// OData string literal with embedded quotes doubled
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Value for an `…@odata.bind` property linking to another record
pub fn bind(entity_set: &str, id: &str) -> String {
    format!("/{}({})", entity_set, id)
}

/// Record id from an `OData-EntityId` header such as
/// `https://org.crm.dynamics.com/api/data/v9.1/contacts(00000000-…)`
pub fn parse_entity_id(entity_id_url: &str) -> Option<String> {
    let start = entity_id_url.rfind('(')?;
    let end = entity_id_url.rfind(')')?;
    (end > start + 1).then(|| entity_id_url[start + 1..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_in_order() {
        let query = ODataQuery::new()
            .filter_eq("ftts_reference", "B-000-123-456")
            .filter("statecode eq 0")
            .select(&["ftts_bookingid", "ftts_bookingstatus"])
            .top(1)
            .order_by("createdon", true);

        assert_eq!(
            query.pairs(),
            vec![
                (
                    "$filter".to_string(),
                    "ftts_reference eq 'B-000-123-456' and statecode eq 0".to_string()
                ),
                ("$select".to_string(), "ftts_bookingid,ftts_bookingstatus".to_string()),
                ("$top".to_string(), "1".to_string()),
                ("$orderby".to_string(), "createdon desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_quote_escapes_apostrophes() {
        assert_eq!(quote("O'Neill"), "'O''Neill'");
    }

    #[test]
    fn test_bind() {
        assert_eq!(bind("contacts", "abc"), "/contacts(abc)");
    }

    #[test]
    fn test_parse_entity_id() {
        assert_eq!(
            parse_entity_id("https://org.crm11.dynamics.com/api/data/v9.1/ftts_bookings(1234-abcd)"),
            Some("1234-abcd".to_string())
        );
        assert_eq!(parse_entity_id("https://org/api/data/v9.1/contacts()"), None);
        assert_eq!(parse_entity_id("no id here"), None);
    }
}
