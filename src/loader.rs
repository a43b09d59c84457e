//! The section loading pipeline.
//!
//! fetch -> decode -> split -> match -> render -> write, as one task. The
//! fetch is the only await; everything after it runs to completion. A failure
//! stops the run, and containers written before it keep their new content.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::binding::{Binding, BindingTable};
use crate::error::{LoadError, Result};
use crate::page::Page;
use crate::render::Renderer;
use crate::section::{Section, split_sections};
use crate::source::{DocumentSource, fetch_text};

/// A section paired with the binding it resolved to, if any.
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'doc, 'tbl> {
    pub section: Section<'doc>,
    pub binding: Option<&'tbl Binding>,
}

/// Split `document` and resolve each section against `bindings`, in order.
pub fn assign<'doc, 'tbl>(
    document: &'doc str,
    bindings: &'tbl BindingTable,
) -> Vec<Assignment<'doc, 'tbl>> {
    split_sections(document)
        .into_iter()
        .map(|section| Assignment {
            section,
            binding: bindings.resolve(section.title),
        })
        .collect()
}

/// One container write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub title: String,
    pub container: String,
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub written: Vec<Written>,
    /// Titles of sections that matched no binding.
    pub skipped: Vec<String>,
}

pub struct SectionLoader<R> {
    source: Box<dyn DocumentSource>,
    renderer: R,
    bindings: BindingTable,
}

impl<R: Renderer> SectionLoader<R> {
    pub fn new(source: Box<dyn DocumentSource>, renderer: R, bindings: BindingTable) -> Self {
        Self {
            source,
            renderer,
            bindings,
        }
    }

    pub fn location(&self) -> &str {
        self.source.location()
    }

    /// Fetch the document and write every matched section into its container.
    ///
    /// Each call re-fetches and overwrites the containers it writes.
    pub async fn load_and_render<P: Page + ?Sized>(&self, page: &mut P) -> Result<LoadReport> {
        let document = fetch_text(self.source.as_ref()).await?;

        let mut report = LoadReport::default();
        let mut seen = HashSet::new();

        for Assignment { section, binding } in assign(&document, &self.bindings) {
            let Some(binding) = binding else {
                debug!(title = section.title, "loader:no binding, skipped");
                report.skipped.push(section.title.to_string());
                continue;
            };

            let rendered =
                self.renderer
                    .render(section.body)
                    .map_err(|source| LoadError::Render {
                        section: section.title.to_string(),
                        source,
                    })?;

            if !seen.insert(binding.container.as_str()) {
                warn!(
                    container = %binding.container,
                    title = section.title,
                    "loader:container already written, overwriting"
                );
            }

            page.set_content(&binding.container, &binding.decorate(&rendered))?;
            debug!(
                container = %binding.container,
                title = section.title,
                bytes = rendered.len(),
                "loader:write"
            );

            report.written.push(Written {
                title: section.title.to_string(),
                container: binding.container.clone(),
            });
        }

        Ok(report)
    }

    /// Fire-and-forget entry point: run the pipeline and report any failure
    /// to the log instead of the caller.
    pub async fn run<P: Page + ?Sized>(&self, page: &mut P) -> Option<LoadReport> {
        match self.load_and_render(page).await {
            Ok(report) => {
                info!(
                    location = self.location(),
                    written = report.written.len(),
                    skipped = report.skipped.len(),
                    "loader:done"
                );
                Some(report)
            }
            Err(err) => {
                error!(
                    location = self.location(),
                    kind = err.kind(),
                    error = %err,
                    "loader:failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::page::{HtmlPage, MemoryPage};
    use crate::render::MarkdownRenderer;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const CONTAINERS: &[&str] = &["abstract", "methodology", "results"];

    /// Document source whose content can be swapped between runs.
    #[derive(Clone)]
    struct StaticSource {
        body: Arc<Mutex<std::result::Result<Vec<u8>, String>>>,
    }

    impl StaticSource {
        fn text(text: &str) -> Self {
            Self {
                body: Arc::new(Mutex::new(Ok(text.as_bytes().to_vec()))),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                body: Arc::new(Mutex::new(Err(message.to_string()))),
            }
        }

        fn set(&self, text: &str) {
            *self.body.lock().unwrap() = Ok(text.as_bytes().to_vec());
        }
    }

    #[async_trait]
    impl DocumentSource for StaticSource {
        fn location(&self) -> &str {
            "memory://paper.md"
        }

        async fn fetch(&self) -> Result<Vec<u8>> {
            self.body
                .lock()
                .unwrap()
                .clone()
                .map_err(|message| LoadError::fetch(self.location(), message))
        }
    }

    struct RejectingRenderer;

    impl Renderer for RejectingRenderer {
        fn render(&self, markdown: &str) -> std::result::Result<String, RenderError> {
            if markdown.contains("<<bad>>") {
                Err(RenderError("unsupported construct".to_string()))
            } else {
                Ok(format!("<p>{}</p>", markdown.trim()))
            }
        }
    }

    fn loader(source: StaticSource) -> SectionLoader<MarkdownRenderer> {
        SectionLoader::new(
            Box::new(source),
            MarkdownRenderer::default(),
            BindingTable::default(),
        )
    }

    #[tokio::test]
    async fn test_abstract_gets_label() {
        let mut page = MemoryPage::with_containers(CONTAINERS);
        let report = loader(StaticSource::text("# Abstract\nHello world"))
            .load_and_render(&mut page)
            .await
            .unwrap();

        assert_eq!(page.get("abstract"), "<h2>Abstract</h2>\n<p>Hello world</p>\n");
        assert_eq!(page.get("methodology"), "");
        assert_eq!(page.get("results"), "");
        assert_eq!(
            report.written,
            vec![Written {
                title: "Abstract".to_string(),
                container: "abstract".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_each_section_goes_to_its_container() {
        let doc = "# Abstract\nShort summary.\n\n# Methodology\nWe used **flights**.\n\n# Results\n- 12% fewer\n";
        let mut page = MemoryPage::with_containers(CONTAINERS);
        loader(StaticSource::text(doc))
            .load_and_render(&mut page)
            .await
            .unwrap();

        assert!(page.get("abstract").contains("Short summary."));
        assert!(!page.get("abstract").contains("flights"));
        assert_eq!(page.get("methodology"), "<p>We used <strong>flights</strong>.</p>\n");
        assert_eq!(page.get("results"), "<ul>\n<li>12% fewer</li>\n</ul>\n");
    }

    #[tokio::test]
    async fn test_unknown_section_writes_nothing() {
        let mut page = MemoryPage::with_containers(CONTAINERS);
        let report = loader(StaticSource::text("# Unknown Section\nIgnored text"))
            .load_and_render(&mut page)
            .await
            .unwrap();

        assert_eq!(page.writes, 0);
        assert!(report.written.is_empty());
        assert_eq!(report.skipped, vec!["Unknown Section".to_string()]);
    }

    #[tokio::test]
    async fn test_leading_text_is_discarded() {
        let doc = "Draft notes about results\n\n# Results\nFinal numbers";
        let mut page = MemoryPage::with_containers(CONTAINERS);
        loader(StaticSource::text(doc))
            .load_and_render(&mut page)
            .await
            .unwrap();

        assert_eq!(page.get("results"), "<p>Final numbers</p>\n");
        assert!(page.containers.values().all(|html| !html.contains("Draft")));
    }

    #[tokio::test]
    async fn test_rerun_replaces_content() {
        let source = StaticSource::text("# Abstract\nFirst version\n# Results\nOld results");
        let loader = loader(source.clone());
        let mut page = MemoryPage::with_containers(CONTAINERS);
        loader.load_and_render(&mut page).await.unwrap();
        assert!(page.get("results").contains("Old results"));

        source.set("# Abstract\nSecond version\n# Results\nNew results");
        loader.load_and_render(&mut page).await.unwrap();

        assert_eq!(page.get("abstract"), "<h2>Abstract</h2>\n<p>Second version</p>\n");
        assert_eq!(page.get("results"), "<p>New results</p>\n");
    }

    #[tokio::test]
    async fn test_rerun_on_html_page_does_not_accumulate() {
        let template = r#"<main><div id="abstract">placeholder</div><div id="methodology"></div><div id="results"></div></main>"#;
        let source = StaticSource::text("# Abstract\nOne");
        let loader = loader(source.clone());
        let mut page = HtmlPage::new(template);

        loader.load_and_render(&mut page).await.unwrap();
        source.set("# Abstract\nTwo");
        loader.load_and_render(&mut page).await.unwrap();

        assert_eq!(page.content("abstract"), Some("<h2>Abstract</h2>\n<p>Two</p>\n"));
        assert!(!page.as_str().contains("One"));
        assert!(!page.as_str().contains("placeholder"));
        assert_eq!(page.as_str().matches("<h2>Abstract</h2>").count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_page_untouched() {
        let mut page = MemoryPage::with_containers(CONTAINERS);
        page.containers
            .insert("abstract".to_string(), "placeholder".to_string());

        let loader = loader(StaticSource::failing("connection refused"));
        let err = loader.load_and_render(&mut page).await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));

        assert!(loader.run(&mut page).await.is_none());
        assert_eq!(page.writes, 0);
        assert_eq!(page.get("abstract"), "placeholder");
    }

    /// Shared buffer the test subscriber writes formatted events into.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fetch_failure_is_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        let mut page = MemoryPage::with_containers(CONTAINERS);
        let outcome = tracing::subscriber::with_default(subscriber, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(loader(StaticSource::failing("connection refused")).run(&mut page))
        });

        assert!(outcome.is_none());
        assert_eq!(page.writes, 0);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("loader:failed"), "{output}");
        assert!(output.contains(r#"kind="fetch""#), "{output}");
        assert!(output.contains("connection refused"), "{output}");
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let source = StaticSource::failing("unused");
        *source.body.lock().unwrap() = Ok(vec![b'#', b' ', 0xff]);
        let mut page = MemoryPage::with_containers(CONTAINERS);

        let err = loader(source).load_and_render(&mut page).await.unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        assert_eq!(page.writes, 0);
    }

    #[tokio::test]
    async fn test_missing_container_keeps_earlier_writes() {
        let doc = "# Abstract\nkept\n# Methodology\nlost\n# Results\nnever reached";
        let mut page = MemoryPage::with_containers(&["abstract", "results"]);

        let err = loader(StaticSource::text(doc))
            .load_and_render(&mut page)
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::Binding { ref container } if container == "methodology"));
        assert!(page.get("abstract").contains("kept"));
        assert_eq!(page.get("results"), "");
    }

    #[tokio::test]
    async fn test_render_failure_stops_pipeline() {
        let doc = "# Abstract\nfine\n# Methodology\n<<bad>>\n# Results\nlater";
        let loader = SectionLoader::new(
            Box::new(StaticSource::text(doc)),
            RejectingRenderer,
            BindingTable::default(),
        );
        let mut page = MemoryPage::with_containers(CONTAINERS);

        let err = loader.load_and_render(&mut page).await.unwrap_err();
        match err {
            LoadError::Render { section, .. } => assert_eq!(section, "Methodology"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(page.get("abstract"), "<h2>Abstract</h2>\n<p>fine</p>");
        assert_eq!(page.get("methodology"), "");
        assert_eq!(page.get("results"), "");
    }

    #[tokio::test]
    async fn test_duplicate_keyword_last_wins() {
        let doc = "# Results (preliminary)\nfirst\n# Results (final)\nsecond";
        let mut page = MemoryPage::with_containers(CONTAINERS);
        let report = loader(StaticSource::text(doc))
            .load_and_render(&mut page)
            .await
            .unwrap();

        assert_eq!(page.get("results"), "<p>second</p>\n");
        assert_eq!(report.written.len(), 2);
    }

    #[tokio::test]
    async fn test_run_returns_report() {
        let mut page = MemoryPage::with_containers(CONTAINERS);
        let report = loader(StaticSource::text("# Results\nok\n# Appendix\nx"))
            .run(&mut page)
            .await
            .unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.skipped, vec!["Appendix".to_string()]);
    }

    #[test]
    fn test_assign() {
        let table = BindingTable::default();
        let assignments = assign("# Abstract\na\n# Appendix\nb\n# Results\nc", &table);
        let containers: Vec<_> = assignments
            .iter()
            .map(|a| a.binding.map(|b| b.container.as_str()))
            .collect();
        assert_eq!(containers, vec![Some("abstract"), None, Some("results")]);
    }
}
