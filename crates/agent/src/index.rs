use std::collections::BTreeSet;

/// Deterministic top-k retrieval over product-name documents.
///
/// Sits at the same boundary the similarity index occupies: `build` over an
/// ordered document sequence, `search` returning the k best snippets.
/// Scoring is token overlap with document order as the tie-break, so the
/// same query always returns the same snippets in the same order.
#[derive(Clone, Debug, Default)]
pub struct ProductIndex {
    documents: Vec<IndexedDocument>,
}

#[derive(Clone, Debug)]
struct IndexedDocument {
    text: String,
    tokens: BTreeSet<String>,
}

impl ProductIndex {
    pub fn build<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let documents = documents
            .into_iter()
            .map(|text| {
                let tokens = tokenize(&text);
                IndexedDocument { text, tokens }
            })
            .collect();
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Return up to `k` documents ranked by shared-token count with the
    /// query, ties broken by document order.
    pub fn search(&self, query: &str, k: usize) -> Vec<String> {
        let query_tokens = tokenize(query);

        let mut scored: Vec<(usize, usize)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(position, document)| {
                let score = document.tokens.intersection(&query_tokens).count();
                (score, position)
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(k)
            .map(|(_, position)| self.documents[position].text.clone())
            .collect()
    }
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
