use std::path::PathBuf;

use common::{
    api::report::{fetch_report, request_export},
    context::Context,
    entities::report::{ReportKind, ReportRow},
    error,
};
use files::service::file::{save_artifact, DownloadSink};

/// Columns shown in the reports table, in display order.
pub const COLUMNS: [&str; 4] = [
    "Наименование компании",
    "БИН",
    "Наименование услуги",
    "Количество",
];

/// Rows where any value contains `query`, ignoring case. An empty query keeps
/// every row.
pub fn filter_rows<'a>(rows: &'a [ReportRow], query: &str) -> Vec<&'a ReportRow> {
    if query.is_empty() {
        return rows.iter().collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| row.contains_lowercase(&needle))
        .collect()
}

/// Requests the export for `kind` and hands it to `sink` as `report_<kind>.xlsx`.
pub async fn export_report<S: DownloadSink>(
    context: &Context,
    kind: ReportKind,
    sink: &S,
) -> error::Result<PathBuf> {
    let artifact = request_export(context, kind).await?;
    save_artifact(sink, &artifact)
}

#[derive(Debug, Default)]
pub struct ReportsView {
    tab: ReportKind,
    rows: Vec<ReportRow>,
    loading: bool,
    query: String,
    error: Option<String>,
}

impl ReportsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> ReportKind {
        self.tab
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// User message of the last failed fetch or export.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn visible_rows(&self) -> Vec<&ReportRow> {
        filter_rows(&self.rows, &self.query)
    }

    /// Switches to `kind` and marks the table as loading until
    /// `finish_load` is called.
    pub fn begin_load(&mut self, kind: ReportKind) {
        self.tab = kind;
        self.loading = true;
    }

    /// Applies a fetch result. A failed load keeps the rows that were already
    /// on screen. Results for a tab that is no longer selected are dropped.
    pub fn finish_load(&mut self, kind: ReportKind, result: error::Result<Vec<ReportRow>>) -> error::Result<()> {
        if kind != self.tab {
            log::debug!("Dropping stale {} rows, {} is selected", kind, self.tab);
            return result.map(|_| ());
        }
        self.loading = false;

        match result {
            Ok(rows) => {
                self.rows = rows;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("Loading {} report failed: {}", kind, err);
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn select_tab(&mut self, context: &Context, kind: ReportKind) -> error::Result<()> {
        self.begin_load(kind);
        let result = fetch_report(context, kind).await;
        self.finish_load(kind, result)
    }

    pub async fn refresh(&mut self, context: &Context) -> error::Result<()> {
        self.select_tab(context, self.tab).await
    }

    /// Exports the current tab. The table is left as it is either way.
    pub async fn export<S: DownloadSink>(&mut self, context: &Context, sink: &S) -> error::Result<PathBuf> {
        let result = export_report(context, self.tab, sink).await;

        if let Err(err) = &result {
            log::error!("Exporting {} report failed: {}", self.tab, err);
            self.error = Some(err.user_message());
        }

        result
    }
}
