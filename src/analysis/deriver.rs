use super::types::{AnalysisContext, FlowDirection, Transaction, TIMELINE_BUCKETS};

/// Maximum counterparties shown on each side of the fund-flow diagram.
pub const MAX_COUNTERPARTIES: usize = 3;

/// Placeholder sources when no inflow counterparty is known.
pub const SOURCE_FALLBACK: [&str; 2] = ["DIRECT-INTAKE", "CASH-DEPOSIT"];

/// Placeholder destinations when no outflow counterparty is known.
pub const DESTINATION_FALLBACK: [&str; 2] = ["LIQUIDATION-PENDING", "ATM-WITHDRAWAL"];

/// Build the fund-flow view-model for one investigated account.
///
/// Pure and total: malformed records degrade to fallbacks, never to errors.
pub fn derive(transactions: &[Transaction], subject_account_id: &str) -> AnalysisContext {
    AnalysisContext {
        timeline: build_timeline(transactions),
        sources: collect_counterparties(
            transactions,
            subject_account_id,
            FlowDirection::Inflow,
            &SOURCE_FALLBACK,
        ),
        destinations: collect_counterparties(
            transactions,
            subject_account_id,
            FlowDirection::Outflow,
            &DESTINATION_FALLBACK,
        ),
    }
}

/// Bucket dated transactions across their observed span and normalize to the busiest bucket.
/// Records without a parsable timestamp are left out of the histogram.
fn build_timeline(transactions: &[Transaction]) -> [f64; TIMELINE_BUCKETS] {
    let mut counts = [0u32; TIMELINE_BUCKETS];

    let mut stamps: Vec<i64> = transactions
        .iter()
        .filter_map(Transaction::timestamp)
        .map(|ts| ts.timestamp_millis())
        .collect();

    if stamps.len() >= 2 {
        stamps.sort();
        let start = stamps[0];
        let end = stamps[stamps.len() - 1];
        // Sorted, so the span is never negative; a zero span becomes 1.
        let span = (end - start).max(1) as f64;

        for ts in &stamps {
            let position = (ts - start) as f64 / span;
            // The last record lands exactly on 1.0; fold it into the final bucket.
            let idx = ((position * TIMELINE_BUCKETS as f64).floor() as usize)
                .min(TIMELINE_BUCKETS - 1);
            counts[idx] += 1;
        }
    }

    let max = counts.iter().copied().max().filter(|&m| m > 0).unwrap_or(1) as f64;
    counts.map(|c| c as f64 / max * 100.0)
}

/// First-seen distinct counterparties moving funds in `direction`, excluding the subject.
fn collect_counterparties(
    transactions: &[Transaction],
    subject_account_id: &str,
    direction: FlowDirection,
    fallback: &[&str],
) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::with_capacity(MAX_COUNTERPARTIES);

    for counterparty in transactions
        .iter()
        .filter(|t| t.flows(direction))
        .filter_map(Transaction::counterparty)
    {
        if counterparty == subject_account_id || seen.contains(&counterparty) {
            continue;
        }
        seen.push(counterparty);
        if seen.len() == MAX_COUNTERPARTIES {
            break;
        }
    }

    if seen.is_empty() {
        tracing::trace!(
            direction = direction.as_str(),
            "No counterparties found, using placeholders"
        );
        return fallback.iter().map(|s| s.to_string()).collect();
    }

    seen.into_iter().map(String::from).collect()
}
