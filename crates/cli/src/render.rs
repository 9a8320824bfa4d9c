use basehealth_node::api::{RecordView, SessionView};
use basehealth_node::notify::NoticeKind;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

fn format_ts(secs: u64) -> String {
    chrono::DateTime::from_timestamp(secs as i64, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Newest first, as the session holds them.
pub fn records_table(records: &[RecordView]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["File", "Fingerprint", "Timestamp", "Source", "Transaction"]);

    for record in records {
        table.add_row(vec![
            record.label.clone(),
            record.hash.to_string(),
            format_ts(record.timestamp),
            record.provenance.to_string(),
            record.tx.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

pub fn print_session(view: &SessionView) {
    if view.demo_mode {
        println!("\n⚠️  DEMO MODE: no contract configured. Nothing below is on the ledger.");
    }
    if let Some(err) = &view.read_error {
        println!("\n⚠️  Ledger read unavailable: {}", err);
    }
    for notice in &view.notifications {
        let mark = match notice.kind {
            NoticeKind::Success => "✅",
            NoticeKind::Failure => "❌",
        };
        println!("\n{} {}", mark, notice.message);
        if let Some(url) = &notice.explorer_url {
            println!("   {}", url);
        }
    }

    if view.records.is_empty() {
        println!("\nNo records yet.\n");
        return;
    }
    println!("\nRecords\n");
    println!("{}\n", records_table(&view.records));
}
