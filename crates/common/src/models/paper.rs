//! Paper record

use serde::{Deserialize, Serialize};

/// One academic paper as shown on the dashboard.
///
/// Base records come from the paper source; `summary` and `insights` are
/// filled in by the fetch service from the enrichment mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub authors: Vec<String>,

    pub published: String,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Canonical external URL, also the enrichment join key
    pub link: String,

    pub primary_category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_count: Option<u32>,

    /// Markdown summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Markdown insights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
}

/// Summary/insights pair keyed by paper link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub insights: String,
}

impl Paper {
    /// Attach summary and insights, empty strings when there is no enrichment.
    pub fn enriched(mut self, enrichment: Option<&Enrichment>) -> Self {
        let (summary, insights) = match enrichment {
            Some(e) => (e.summary.clone(), e.insights.clone()),
            None => (String::new(), String::new()),
        };
        self.summary = Some(summary);
        self.insights = Some(insights);
        self
    }

    /// Link of the PDF rendition (`http` -> `https`, `abs` -> `pdf`).
    pub fn pdf_url(&self) -> String {
        self.link.replacen("http", "https", 1).replacen("abs", "pdf", 1)
    }

    /// arXiv identifier taken from the link, or the link itself for other hosts.
    pub fn arxiv_id(&self) -> &str {
        if self.link.contains("arxiv.org") {
            self.link.rsplit('/').next().unwrap_or(&self.link)
        } else {
            &self.link
        }
    }

    /// Summary as rendered in the detail panel.
    ///
    /// Generated summaries open with a heading line unless they start straight
    /// into a numbered list; that heading is dropped.
    pub fn display_summary(&self) -> String {
        match self.summary.as_deref() {
            Some(s) if !s.is_empty() && !s.starts_with("1.") => {
                s.split('\n').skip(1).collect::<Vec<_>>().join("\n")
            }
            Some(s) => s.to_string(),
            None => String::new(),
        }
    }
}
