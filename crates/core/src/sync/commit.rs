//! Marking sent rows as uploaded.

use possync_domain::constants::{ITEM_TABLE, PAYMENT_TABLE};
use possync_domain::{CommitCounts, CommitOutcome, LogStatus, Result};
use serde_json::json;

use super::ports::PrimaryConnector;
use super::run_log::RunLog;

const COMMIT_FAILED: &str = "Could not update tables";
const COMMIT_SUCCEEDED: &str = "Tables updated successfully";

/// Open a fresh primary connection and mark every unmarked payment and item
/// row in one transaction.
///
/// Never fails: a connection or transaction error reports ERROR with both
/// counts at zero, and touching no rows at all also reports ERROR.
pub async fn commit_uploads(connector: &dyn PrimaryConnector, log: &mut RunLog) -> CommitOutcome {
    let counts = match mark_uploaded(connector).await {
        Ok(counts) => counts,
        Err(err) => {
            log.error(COMMIT_FAILED, json!({ "error": err.to_string() }));
            return CommitOutcome {
                status: LogStatus::Error,
                message: COMMIT_FAILED.to_string(),
                payment_rows_affected: 0,
                items_rows_affected: 0,
            };
        }
    };

    let context = json!({
        "paymentRowsAffected": counts.payment_rows,
        "itemsRowsAffected": counts.item_rows,
    });

    if counts.payment_rows == 0 && counts.item_rows == 0 {
        let message = format!("No rows were updated in {PAYMENT_TABLE} or {ITEM_TABLE}");
        log.warn(&message, context);
        return CommitOutcome {
            status: LogStatus::Error,
            message,
            payment_rows_affected: 0,
            items_rows_affected: 0,
        };
    }

    log.success(COMMIT_SUCCEEDED, context);
    CommitOutcome {
        status: LogStatus::Success,
        message: COMMIT_SUCCEEDED.to_string(),
        payment_rows_affected: counts.payment_rows,
        items_rows_affected: counts.item_rows,
    }
}

async fn mark_uploaded(connector: &dyn PrimaryConnector) -> Result<CommitCounts> {
    let mut store = connector.connect().await?;
    store.commit_uploads().await
}
