use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error};

use kopi_core::domain::conversation::{ConversationTurn, SessionContext};
use kopi_core::{calculator, Intent};

use crate::llm::{LlmClient, LlmError};
use crate::tools::{OutletTool, ProductTool};

pub const CALCULATOR_BANNER: &str = "Initializing Calculator Tool...";

const PRODUCT_SERVICE_APOLOGY: &str =
    "Sorry, the service is currently down. Please try again later.";
const OUTLET_SERVICE_APOLOGY: &str =
    "Sorry, I encountered an error while searching for outlets. Please try again later.";
const GENERAL_APOLOGY: &str =
    "Sorry, I ran into a problem while answering that. Please try again.";

/// Routes utterances to handlers and keeps per-session history.
///
/// Sessions are keyed by a caller-supplied identifier; a session's history
/// is an append-only (user, assistant) turn sequence that only `clear_history`
/// empties. Collaborator failures never escape `handle`: they are logged and
/// degraded to fixed apology strings at this boundary.
pub struct DispatchRouter {
    products: ProductTool,
    outlets: OutletTool,
    llm: Arc<dyn LlmClient>,
    sessions: Mutex<HashMap<String, SessionContext>>,
}

impl DispatchRouter {
    pub fn new(products: ProductTool, outlets: OutletTool, llm: Arc<dyn LlmClient>) -> Self {
        Self { products, outlets, llm, sessions: Mutex::new(HashMap::new()) }
    }

    /// Classify, dispatch, and record one exchange under `session_id`.
    pub async fn handle(&self, session_id: &str, utterance: &str) -> String {
        let reply = self.respond(utterance).await;

        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id))
            .record_exchange(utterance, &reply);

        reply
    }

    /// Reset one session's history to empty, unconditionally. Unknown
    /// session ids are a no-op.
    pub async fn clear_history(&self, session_id: &str) {
        if let Some(session) = self.sessions.lock().await.get_mut(session_id) {
            session.clear();
        }
    }

    pub async fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(|session| session.turns().to_vec())
            .unwrap_or_default()
    }

    async fn respond(&self, utterance: &str) -> String {
        let intent = Intent::classify(utterance);
        debug!(event_name = "chat.dispatch", intent = ?intent, "dispatching utterance");

        match intent {
            Intent::Arithmetic => {
                let evaluation = calculator::process(utterance);
                format!("{CALCULATOR_BANNER}\n\n{}", evaluation.message)
            }
            Intent::ProductQuery => match self.products.answer(utterance).await {
                Ok(summary) => summary,
                Err(failure) => {
                    error!(
                        event_name = "chat.product_tool.failed",
                        error = %failure,
                        "product tool failed"
                    );
                    PRODUCT_SERVICE_APOLOGY.to_string()
                }
            },
            Intent::OutletQuery => match self.outlets.lookup(utterance).await {
                Ok(outcome) => OutletTool::format_reply(&outcome),
                Err(failure) => {
                    error!(
                        event_name = "chat.outlet_tool.failed",
                        error = %failure,
                        "outlet lookup failed"
                    );
                    OUTLET_SERVICE_APOLOGY.to_string()
                }
            },
            Intent::GeneralConversation => match self.plan_and_act(utterance).await {
                Ok(reply) => reply,
                Err(failure) => {
                    error!(
                        event_name = "chat.plan_act.failed",
                        error = %failure,
                        "plan/act exchange failed"
                    );
                    GENERAL_APOLOGY.to_string()
                }
            },
        }
    }

    /// The two-step fallback: a planning completion whose output is consumed
    /// only as context by the acting completion. The plan text is never
    /// shown to the user.
    async fn plan_and_act(&self, utterance: &str) -> Result<String, LlmError> {
        let plan = self.llm.complete(&planning_prompt(utterance)).await?;
        self.llm.complete(&action_prompt(&plan, utterance)).await
    }
}

fn planning_prompt(utterance: &str) -> String {
    format!(
        "You are a helpful AI agent. When the user gives a message, plan the steps required to respond clearly.\n\
         User Message: \"{utterance}\"\n\
         What is your plan?\n\
         Respond in this format:\n\
         PLAN: <brief plan>\n\
         THINK: <your reasoning>\n\
         ACTION: <what to do now>"
    )
}

fn action_prompt(plan: &str, utterance: &str) -> String {
    format!(
        "You have planned the following:\n\
         {plan}\n\
         \n\
         Now execute the response for the user based on your plan.\n\
         User: {utterance}\n\
         Assistant:"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use kopi_core::domain::conversation::Role;
    use kopi_core::domain::outlet::OutletSummary;
    use kopi_db::{OutletStore, StoreError};

    use crate::index::ProductIndex;
    use crate::llm::{LlmClient, LlmError};
    use crate::tools::{OutletTool, ProductTool};

    use super::DispatchRouter;

    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        async fn prompts(&self) -> Vec<String> {
            self.prompts.lock().await.clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().await.push(prompt.to_string());
            self.replies
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| LlmError::Malformed("script exhausted".to_string()))
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Transport("connection refused".to_string()))
        }
    }

    struct MemoryOutletStore {
        rows: Vec<OutletSummary>,
    }

    #[async_trait]
    impl OutletStore for MemoryOutletStore {
        async fn execute(&self, _sql: &str) -> Result<Vec<OutletSummary>, StoreError> {
            Ok(self.rows.clone())
        }
    }

    struct FailingOutletStore;

    #[async_trait]
    impl OutletStore for FailingOutletStore {
        async fn execute(&self, _sql: &str) -> Result<Vec<OutletSummary>, StoreError> {
            Err(StoreError::Decode("no such table: outlets".to_string()))
        }
    }

    fn outlet_fixture() -> OutletSummary {
        OutletSummary {
            name: "Kopi Corner - Jaya One".to_string(),
            address: "Block K, Jaya One".to_string(),
            hours: "08:00-21:00".to_string(),
            services: "coffee,wifi".to_string(),
        }
    }

    fn router_with(llm: Arc<dyn LlmClient>, store: Arc<dyn OutletStore>) -> DispatchRouter {
        let index = ProductIndex::build(
            ["Frozee Cold Cup 650ml", "All-Day Tumbler 500ml"].map(String::from),
        );
        DispatchRouter::new(
            ProductTool::new(index, llm.clone()),
            OutletTool::new(store),
            llm,
        )
    }

    #[tokio::test]
    async fn arithmetic_routes_to_the_calculator_without_llm_calls() {
        let llm = ScriptedLlm::new(&[]);
        let store = Arc::new(MemoryOutletStore { rows: vec![outlet_fixture()] });
        let router = router_with(llm.clone(), store);

        let reply = router.handle("s-1", "2 + 2").await;
        assert_eq!(reply, "Initializing Calculator Tool...\n\nResult: 2.0 + 2.0 = 4.0");
        assert!(llm.prompts().await.is_empty());
    }

    #[tokio::test]
    async fn division_by_zero_surfaces_the_explicit_error() {
        let llm = ScriptedLlm::new(&[]);
        let store = Arc::new(MemoryOutletStore { rows: Vec::new() });
        let router = router_with(llm, store);

        let reply = router.handle("s-1", "10 / 0").await;
        assert!(reply.ends_with("Error: Division by zero is not allowed."));
    }

    #[tokio::test]
    async fn product_queries_return_the_completion_verbatim() {
        let llm = ScriptedLlm::new(&["The biggest cup is the Frozee Cold Cup 650ml."]);
        let store = Arc::new(MemoryOutletStore { rows: Vec::new() });
        let router = router_with(llm.clone(), store);

        let reply = router.handle("s-1", "which product is the biggest cup?").await;
        assert_eq!(reply, "The biggest cup is the Frozee Cold Cup 650ml.");

        let prompts = llm.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Based on the following product information"));
        assert!(prompts[0].contains("which product is the biggest cup?"));
    }

    #[tokio::test]
    async fn outlet_queries_format_store_rows() {
        let llm = ScriptedLlm::new(&[]);
        let store = Arc::new(MemoryOutletStore { rows: vec![outlet_fixture()] });
        let router = router_with(llm, store);

        let reply = router.handle("s-1", "outlets in pj with wifi").await;
        assert!(reply.starts_with("I found the following outlets:"));
        assert!(reply.contains("**Kopi Corner - Jaya One**"));
    }

    #[tokio::test]
    async fn empty_outlet_results_say_so() {
        let llm = ScriptedLlm::new(&[]);
        let store = Arc::new(MemoryOutletStore { rows: Vec::new() });
        let router = router_with(llm, store);

        let reply = router.handle("s-1", "outlets on the moon").await;
        assert_eq!(reply, "I couldn't find any outlets matching your query.");
    }

    #[tokio::test]
    async fn plan_then_act_consumes_the_plan_silently() {
        let llm = ScriptedLlm::new(&[
            "PLAN: greet\nTHINK: simple\nACTION: reply warmly",
            "Hello! How can I help you today?",
        ]);
        let store = Arc::new(MemoryOutletStore { rows: Vec::new() });
        let router = router_with(llm.clone(), store);

        let reply = router.handle("s-1", "hello there").await;
        assert_eq!(reply, "Hello! How can I help you today?");

        let prompts = llm.prompts().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("What is your plan?"));
        assert!(prompts[0].contains("hello there"));
        // The act prompt carries the plan text as context.
        assert!(prompts[1].contains("PLAN: greet"));
        assert!(prompts[1].contains("User: hello there"));
        // The plan text itself is never the user-visible reply.
        assert!(!reply.contains("PLAN:"));
    }

    #[tokio::test]
    async fn collaborator_failures_become_apologies() {
        let store: Arc<dyn OutletStore> = Arc::new(FailingOutletStore);
        let router = router_with(Arc::new(FailingLlm), store);

        let product_reply = router.handle("s-1", "tell me about this product").await;
        assert_eq!(product_reply, "Sorry, the service is currently down. Please try again later.");

        let outlet_reply = router.handle("s-1", "outlets near me... any store?").await;
        assert_eq!(
            outlet_reply,
            "Sorry, I encountered an error while searching for outlets. Please try again later."
        );

        let general_reply = router.handle("s-1", "how are you?").await;
        assert_eq!(
            general_reply,
            "Sorry, I ran into a problem while answering that. Please try again."
        );
    }

    #[tokio::test]
    async fn sessions_are_isolated_and_clearable() {
        let llm = ScriptedLlm::new(&[]);
        let store = Arc::new(MemoryOutletStore { rows: Vec::new() });
        let router = router_with(llm, store);

        router.handle("alice", "2 + 2").await;
        router.handle("bob", "3 * 3").await;

        let alice = router.history("alice").await;
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].role, Role::User);
        assert_eq!(alice[0].content, "2 + 2");
        assert!(alice[1].content.contains("4.0"));

        let bob = router.history("bob").await;
        assert_eq!(bob.len(), 2);
        assert_eq!(bob[0].content, "3 * 3");

        router.clear_history("alice").await;
        assert!(router.history("alice").await.is_empty());
        assert_eq!(router.history("bob").await.len(), 2);

        // Clearing an unknown session is a no-op, not an error.
        router.clear_history("nobody").await;
    }
}
