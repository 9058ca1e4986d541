//! Training-stage helpers shared by [`Trainer`] implementations.

use std::path::Path;

use tracing::info;

use super::sdk::Trainer;
use crate::data::{csv, distinct_settings, Corpus, ParameterSchema};
use crate::{Error, Result};

/// Corpus snapshot written into every training directory before fitting.
pub const CORPUS_SNAPSHOT: &str = "sampled_data.csv";

/// Fail with `Error::Training` unless the corpus holds at least
/// `min_settings` distinct parameter settings. Returns the count.
///
/// # Errors
/// `Error::Training` for a thin or malformed corpus.
pub fn ensure_trainable(corpus: &Corpus, schema: &ParameterSchema, min_settings: usize) -> Result<usize> {
    let settings = distinct_settings(corpus, schema).map_err(|e| Error::Training(e.to_string()))?;
    if settings < min_settings {
        return Err(Error::Training(format!(
            "corpus holds {settings} distinct parameter settings, at least {min_settings} required"
        )));
    }
    Ok(settings)
}

/// Snapshot the corpus into `out_dir`, then fit.
///
/// # Errors
/// IO failures writing the snapshot, and whatever the trainer returns.
pub fn train_surrogate<T: Trainer + ?Sized>(
    trainer: &mut T,
    corpus: &Corpus,
    schema: &ParameterSchema,
    out_dir: &Path,
) -> Result<T::Model> {
    csv::write_table(out_dir.join(CORPUS_SNAPSHOT), corpus)?;
    info!(rows = corpus.num_rows(), columns = corpus.num_columns(), "fitting surrogate");
    trainer.train(corpus, schema, out_dir)
}
