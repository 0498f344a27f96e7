use crate::{
    api::ensure_success,
    context::Context,
    entities::report::{ExportArtifact, ReportKind, ReportRow},
    error,
    services::API_PREFIX,
};

pub fn report_path(kind: ReportKind) -> String {
    format!("/{}/reports/{}", API_PREFIX, kind.as_str())
}

pub fn export_path(kind: ReportKind) -> String {
    format!("/{}/export/{}", API_PREFIX, kind.as_str())
}

pub async fn fetch_report(context: &Context, kind: ReportKind) -> error::Result<Vec<ReportRow>> {
    let response = context.make_request().get(report_path(kind)).send().await?;

    let rows = ensure_success(response)?
        .json::<Vec<ReportRow>>()
        .await?;

    log::info!("Fetched {} rows of {} report", rows.len(), kind);

    Ok(rows)
}

/// Downloads the spreadsheet the backend renders for `kind`. The payload is
/// passed through untouched.
pub async fn request_export(context: &Context, kind: ReportKind) -> error::Result<ExportArtifact> {
    let response = context.make_request().get(export_path(kind)).send().await?;

    let bytes = ensure_success(response)?.bytes().await?;

    log::info!("Received {} export ({} bytes)", kind, bytes.len());

    Ok(ExportArtifact::spreadsheet(kind, bytes.to_vec()))
}
