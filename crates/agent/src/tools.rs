use std::sync::Arc;

use serde::Serialize;

use kopi_core::domain::outlet::OutletSummary;
use kopi_core::QueryCompiler;
use kopi_db::{OutletStore, StoreError};

use crate::index::ProductIndex;
use crate::llm::{LlmClient, LlmError};

/// How many product snippets are retrieved per question.
pub const TOP_K_SNIPPETS: usize = 5;

/// Answers product questions: retrieve the top-k catalog snippets, build the
/// summarization prompt, hand it to the LLM, return the completion verbatim.
pub struct ProductTool {
    index: ProductIndex,
    llm: Arc<dyn LlmClient>,
}

impl ProductTool {
    pub fn new(index: ProductIndex, llm: Arc<dyn LlmClient>) -> Self {
        Self { index, llm }
    }

    pub async fn answer(&self, query: &str) -> Result<String, LlmError> {
        let snippets = self.index.search(query, TOP_K_SNIPPETS);
        let prompt = product_prompt(&snippets, query);
        self.llm.complete(&prompt).await
    }
}

fn product_prompt(snippets: &[String], query: &str) -> String {
    format!(
        "Based on the following product information, please answer the user's question.\n\
         \n\
         Product Information:\n\
         - {}\n\
         \n\
         User's Question:\n\
         - {}\n\
         \n\
         Answer:",
        snippets.join(", "),
        query
    )
}

/// Result of one outlet lookup: the compiled SQL (reported to API callers)
/// and the matching rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutletQueryOutcome {
    pub sql_query: String,
    pub results: Vec<OutletSummary>,
}

/// Answers outlet questions: compile the utterance to SQL, execute it
/// against the store, format the rows.
pub struct OutletTool {
    compiler: QueryCompiler,
    store: Arc<dyn OutletStore>,
}

impl OutletTool {
    pub fn new(store: Arc<dyn OutletStore>) -> Self {
        Self { compiler: QueryCompiler::new(), store }
    }

    pub async fn lookup(&self, query: &str) -> Result<OutletQueryOutcome, StoreError> {
        let sql_query = self.compiler.convert(query);
        let results = self.store.execute(&sql_query).await?;
        Ok(OutletQueryOutcome { sql_query, results })
    }

    pub fn format_reply(outcome: &OutletQueryOutcome) -> String {
        if outcome.results.is_empty() {
            return "I couldn't find any outlets matching your query.".to_string();
        }

        let mut reply = String::from("I found the following outlets:\n\n");
        for outlet in &outcome.results {
            reply.push_str(&format!(
                "**{}**\nAddress: {}\nHours: {}\nServices: {}\n\n",
                outlet.name, outlet.address, outlet.hours, outlet.services
            ));
        }
        reply
    }
}
