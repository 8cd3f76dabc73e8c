//! Weekly statement and toll import example

use rideshare_reconcile::utils::MemoryStorage;
use rideshare_reconcile::{
    PageText, ReconciliationEngine, Shift, StatementDocument, TextFragment, TextSummaryRenderer,
};
use chrono::NaiveDate;

fn row(y: f32, cells: &[(&str, f32)]) -> Vec<TextFragment> {
    cells
        .iter()
        .map(|(text, x)| TextFragment::new(*text, *x, y))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Rideshare Reconcile - Weekly Import Example\n");

    // Page text as a PDF extractor would hand it over
    let fragments = [
        row(20.0, &[("Statement period:", 10.0), ("Oct 13, 2025 4 AM - Oct 20, 2025 4 AM", 150.0)]),
        row(
            40.0,
            &[
                ("Processed", 10.0),
                ("Event", 120.0),
                ("Earnings", 300.0),
                ("Refunds & Expenses", 360.0),
                ("Payouts", 430.0),
                ("Balance", 500.0),
            ],
        ),
        row(
            60.0,
            &[
                ("Oct 19", 10.0),
                ("7:49 PM", 50.0),
                ("UberX", 120.0),
                ("$21.55", 300.0),
                ("$2.71", 360.0),
                ("$0.00", 430.0),
                ("$448.32", 500.0),
            ],
        ),
        row(72.0, &[("Oct 19", 10.0), ("7:21 PM", 50.0), ("$448.32", 500.0)]),
        row(
            90.0,
            &[
                ("Oct 19", 10.0),
                ("8:02 PM", 50.0),
                ("Tip", 120.0),
                ("$5.00", 300.0),
                ("$0.00", 360.0),
                ("$0.00", 430.0),
                ("$453.32", 500.0),
            ],
        ),
    ]
    .concat();
    let document = StatementDocument::new(vec![PageText::new(fragments)]);

    let start = NaiveDate::from_ymd_opt(2025, 10, 19)
        .and_then(|d| d.and_hms_opt(17, 0, 0))
        .ok_or("invalid shift start")?;
    let mut shifts = vec![Shift::new(start, None)];

    let mut engine = ReconciliationEngine::new(MemoryStorage::new());

    // 1. Import the statement
    println!("Importing statement...");
    let report = engine.import_statement(&document, &shifts).await?;
    println!(
        "  Period {}: {} parsed, {} failed, {} matched to shifts",
        report.batch_tag.as_deref().unwrap_or("-"),
        report.parsed,
        report.failed,
        report.assigned
    );
    for diagnostic in &report.diagnostics {
        println!("  ! {}: {}", diagnostic.row_text, diagnostic.error);
    }
    println!();

    // 2. Import toll history
    println!("Importing tolls...");
    let csv = "Transaction Date,Location,Plate,Amount\n\
               10/19/2025 06:10 PM,I-405 Express,ABC1234,-$3.00\n\
               10/19/2025 09:45 PM,SR-520 Bridge,ABC1234,-$2.00\n\
               10/21/2025 08:00 AM,SR-520 Bridge,ABC1234,-$2.00\n";
    let tolls = engine.import_tolls(csv, &mut shifts, &TextSummaryRenderer)?;
    for update in &tolls.updated {
        println!("  Shift {}: tolls ${}", update.shift_id, update.total);
    }
    println!("  {} charge(s) matched no shift", tolls.unmatched.len());
    println!();

    // 3. Weekly totals
    let totals = engine.totals(None).await?;
    println!("Weekly totals:");
    println!("  Net fare:   ${}", totals.net_fare);
    println!("  Tips:       ${}", totals.tips);
    println!("  Promotions: ${}", totals.promotions);
    println!("  Tolls:      ${}", totals.toll_reimbursements);
    println!("  Earnings:   ${}", totals.earnings());

    Ok(())
}
