use std::path::PathBuf;

use common::{
    context::Context,
    entities::{
        file::{UploadFile, UploadTarget},
        report::{ReportKind, ReportRow},
    },
    error,
};
use files::{handlers::upload::FOOTER, DirectorySink, UploadPage};

use crate::service::report::{ReportsView, COLUMNS};

pub fn render_table(rows: &[&ReportRow]) -> String {
    let mut table = COLUMNS.join("\t");
    table.push('\n');

    for row in rows {
        let cells: Vec<String> = COLUMNS.iter().map(|column| row.text(column)).collect();
        table.push_str(&cells.join("\t"));
        table.push('\n');
    }

    table
}

pub async fn upload(context: &Context, target: UploadTarget, paths: Vec<PathBuf>) -> error::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(UploadFile::open(path).await?);
    }

    let mut page = UploadPage::new();
    let result = page.select_files(context, target, files).await;

    if let Some(zone) = page.zone(target) {
        println!("{}", zone.label());
        println!("Статус: {} — {}", zone.status(), zone.message());
    }
    if result.is_ok() {
        println!("{}", FOOTER);
    }

    result
}

pub async fn show(context: &Context, kind: ReportKind, filter: Option<String>) -> error::Result<()> {
    let mut view = ReportsView::new();
    view.select_tab(context, kind).await?;

    if let Some(filter) = filter {
        view.set_query(filter);
    }

    let rows = view.visible_rows();
    print!("{}", render_table(&rows));
    println!("{} / {}", rows.len(), view.rows().len());

    Ok(())
}

pub async fn export(context: &Context, kind: ReportKind, out_dir: PathBuf) -> error::Result<()> {
    let sink = DirectorySink::new(out_dir);
    let saved = crate::service::report::export_report(context, kind, &sink).await?;

    println!("{}", saved.display());

    Ok(())
}
