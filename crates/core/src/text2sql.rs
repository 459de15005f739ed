//! Outlet natural-language query compilation.
//!
//! The compiler maps an utterance onto a fixed projection plus predicates
//! drawn from an allow-listed table. User text is only ever *matched
//! against*; no fragment of it reaches the output, so the compiled SQL is
//! injection-immune by construction rather than by escaping.

/// Fixed projection every compiled query starts from.
pub const PROJECTION: &str = "SELECT name, address, hours, services FROM outlets";

/// The allow-listed predicate vocabulary. Each entry is independently
/// optional; matches are AND-combined in declaration order.
const PREDICATES: &[(&[&str], &str)] = &[
    (&["kuala lumpur", "kl"], "city LIKE '%Kuala Lumpur%'"),
    (&["selangor", "pj"], "state LIKE '%Selangor%'"),
    (&["parking"], "parking_available = 1"),
    (&["wifi"], "wifi_available = 1"),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile a natural-language outlet query into SQL text.
    ///
    /// Matching happens against the lower-cased query. When no predicate
    /// matches, the WHERE clause is omitted entirely. Output always ends
    /// with ` LIMIT 10;`.
    pub fn convert(&self, natural_query: &str) -> String {
        let normalized = natural_query.to_lowercase();
        let conditions: Vec<&str> = PREDICATES
            .iter()
            .filter(|(triggers, _)| triggers.iter().any(|trigger| normalized.contains(trigger)))
            .map(|(_, predicate)| *predicate)
            .collect();

        let mut sql = String::from(PROJECTION);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" LIMIT 10;");
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::QueryCompiler;

    #[test]
    fn no_predicate_means_no_where_clause() {
        let compiler = QueryCompiler::new();
        assert_eq!(
            compiler.convert("show me all outlets"),
            "SELECT name, address, hours, services FROM outlets LIMIT 10;"
        );
    }

    #[test]
    fn city_and_amenity_predicates_combine_with_and() {
        let compiler = QueryCompiler::new();
        assert_eq!(
            compiler.convert("outlets in kuala lumpur with wifi"),
            "SELECT name, address, hours, services FROM outlets \
             WHERE city LIKE '%Kuala Lumpur%' AND wifi_available = 1 LIMIT 10;"
        );
    }

    #[test]
    fn predicate_order_follows_the_table_not_the_utterance() {
        let compiler = QueryCompiler::new();
        // "wifi" appears before "kl" in the text; output order is fixed.
        assert_eq!(
            compiler.convert("wifi outlets in kl"),
            "SELECT name, address, hours, services FROM outlets \
             WHERE city LIKE '%Kuala Lumpur%' AND wifi_available = 1 LIMIT 10;"
        );
    }

    #[test]
    fn pj_triggers_the_selangor_predicate() {
        let compiler = QueryCompiler::new();
        assert_eq!(
            compiler.convert("any store in PJ with parking?"),
            "SELECT name, address, hours, services FROM outlets \
             WHERE state LIKE '%Selangor%' AND parking_available = 1 LIMIT 10;"
        );
    }

    #[test]
    fn all_four_predicates_can_stack() {
        let compiler = QueryCompiler::new();
        assert_eq!(
            compiler.convert("kl or selangor outlets with parking and wifi"),
            "SELECT name, address, hours, services FROM outlets \
             WHERE city LIKE '%Kuala Lumpur%' AND state LIKE '%Selangor%' \
             AND parking_available = 1 AND wifi_available = 1 LIMIT 10;"
        );
    }

    #[test]
    fn injection_attempts_never_reach_the_output() {
        let compiler = QueryCompiler::new();
        let sql = compiler.convert("List outlets; DROP TABLE outlets;");
        assert_eq!(sql, "SELECT name, address, hours, services FROM outlets LIMIT 10;");
        assert!(!sql.to_lowercase().contains("drop"));

        // A hostile query that also matches a trigger still only emits
        // allow-listed fragments.
        let sql = compiler.convert("kl'; DELETE FROM outlets; --");
        assert_eq!(
            sql,
            "SELECT name, address, hours, services FROM outlets \
             WHERE city LIKE '%Kuala Lumpur%' LIMIT 10;"
        );
    }

    #[test]
    fn compilation_is_deterministic() {
        let compiler = QueryCompiler::new();
        let query = "outlets in kuala lumpur with wifi";
        assert_eq!(compiler.convert(query), compiler.convert(query));
    }
}
