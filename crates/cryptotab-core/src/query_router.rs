//! Keyword routing table for free-text queries.
//!
//! Routing is substring matching: the query is lower-cased and checked for
//! each keyword in registration order. The first keyword found wins.

/// Message returned when no keyword matches.
pub const UNSUPPORTED_QUERY_MESSAGE: &str = "Unsupported query type";

/// One keyword → operation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<Op> {
    keyword: String,
    operation: Op,
}

impl<Op> Route<Op> {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn operation(&self) -> &Op {
        &self.operation
    }

    fn matches(&self, lowered_query: &str) -> bool {
        lowered_query.contains(self.keyword.as_str())
    }
}

/// Ordered, first-match-wins routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRouter<Op> {
    routes: Vec<Route<Op>>,
}

impl<Op> Default for QueryRouter<Op> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<Op: Copy> QueryRouter<Op> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route; keywords are stored lower-cased.
    pub fn route(mut self, keyword: &str, operation: Op) -> Self {
        self.routes.push(Route {
            keyword: keyword.trim().to_lowercase(),
            operation,
        });
        self
    }

    pub fn resolve(&self, query: &str) -> Option<Op> {
        let lowered = query.to_lowercase();
        self.routes
            .iter()
            .find(|route| route.matches(&lowered))
            .map(|route| route.operation)
    }

    pub fn routes(&self) -> &[Route<Op>] {
        &self.routes
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.routes.iter().map(Route::keyword).collect()
    }
}
