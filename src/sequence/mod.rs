//! Reference code generation
//!
//! Codes are derived by scanning the records that already exist, so a create
//! in a sequence family must not interleave with another create in the same
//! family. `FamilyLocks` provides that serialization; the functions here are
//! pure.

mod locks;

pub use locks::FamilyLocks;

use crate::error::{RegisterError, RegisterResult};
use crate::models::batch::{self, parse_suffix};
use crate::models::{Record, RecordId};

/// Suffix for the next batch of `year`
///
/// Only batches whose `yearOfReceipt` equals `year` count. With none the
/// suffix is `"00"`, with exactly one it is `"01"`: the count of existing
/// batches rather than an increment of a parsed maximum. If that one batch
/// already holds suffix `01` the count would collide, so the maximum rule
/// applies instead. From two batches on it is the largest parsed suffix plus
/// one.
///
/// Batches without a `batchNumber` yet are skipped in the maximum. A
/// malformed `batchNumber` is an error, as is finding no parsable number at
/// all among two or more batches.
pub fn next_batch_suffix(existing: &[Record], year: &str) -> RegisterResult<String> {
    let same_year: Vec<&Record> = existing
        .iter()
        .filter(|record| record.get_str(batch::YEAR_FIELD) == Some(year))
        .collect();

    match same_year.as_slice() {
        [] => return Ok(pad(0)),
        [only] => {
            let taken = only
                .get_str(batch::NUMBER_FIELD)
                .map(parse_suffix)
                .transpose()
                .map_err(|e| RegisterError::Sequence(format!("batch {}: {}", only.id, e)))?;
            if taken != Some(1) {
                return Ok(pad(1));
            }
        }
        _ => {}
    }

    let mut max: Option<u32> = None;
    for record in same_year {
        let Some(code) = record.get_str(batch::NUMBER_FIELD) else {
            continue;
        };
        let suffix = parse_suffix(code)
            .map_err(|e| RegisterError::Sequence(format!("batch {}: {}", record.id, e)))?;
        max = Some(max.map_or(suffix, |current| current.max(suffix)));
    }

    let max = max.ok_or_else(|| {
        RegisterError::Sequence(format!("No batch numbers assigned yet for year {}", year))
    })?;
    Ok(pad(u64::from(max) + 1))
}

/// Suffix for an item with store-assigned id `created_item_id`
pub fn next_item_suffix(created_item_id: RecordId) -> String {
    pad(created_item_id.value() + 1)
}

fn pad(n: u64) -> String {
    format!("{:02}", n)
}
