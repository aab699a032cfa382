//! Inner join of the public and private tables on (country, year).
use crate::error::{CoreError, Result, Side};
use crate::store::{columns, Cell, Frame, FrameError, JoinKey};
use std::collections::{HashMap, HashSet};

pub const PUBLIC_SUFFIX: &str = "_pub";
pub const PRIVATE_SUFFIX: &str = "_priv";

/// Joins `public` and `private` on (country, year).
///
/// The output holds the key columns, then every non-key public column, then
/// every non-key private column. A non-key name present on both sides is
/// suffixed with `_pub` / `_priv`. Rows keep the public table's order; keys
/// missing from either side are dropped, and so are rows whose key cannot be
/// read (blank country, non-integer year), since they can match nothing.
///
/// # Errors
/// - `Schema` if a side lacks `country` or `year`; `Frame` if trimming makes
///   two headers collide.
/// - `DuplicateKey` if a readable key repeats within one side.
/// - `EmptyResult` (non-fatal) if no key is shared. It carries the empty,
///   fully-columned join.
pub fn join(public: &Frame, private: &Frame) -> Result<Frame> {
    let public = trimmed(public, Side::Public)?;
    let private = trimmed(private, Side::Private)?;

    let public_keys = extract_keys(&public, Side::Public)?;
    let private_keys = extract_keys(&private, Side::Private)?;

    let private_index: HashMap<&JoinKey, usize> = private_keys
        .iter()
        .enumerate()
        .filter_map(|(row, key)| key.as_ref().map(|key| (key, row)))
        .collect();

    // (public row, private row) pairs in public order.
    let matches: Vec<(usize, usize)> = public_keys
        .iter()
        .enumerate()
        .filter_map(|(row, key)| private_index.get(key.as_ref()?).map(|&other| (row, other)))
        .collect();

    let dropped_public = public.row_count() - matches.len();
    let dropped_private = private.row_count() - matches.len();
    if dropped_public > 0 || dropped_private > 0 {
        let unreadable_public = public_keys.iter().filter(|k| k.is_none()).count();
        let unreadable_private = private_keys.iter().filter(|k| k.is_none()).count();
        tracing::warn!(
            dropped_public,
            dropped_private,
            unreadable_public,
            unreadable_private,
            "rows without a matching key were dropped"
        );
    }

    let joined = assemble(&public, &private, &public_keys, &matches)
        .map_err(|source| CoreError::Frame { side: Side::Joined, source })?;

    if joined.is_empty() {
        return Err(CoreError::EmptyResult {
            public_rows: public.row_count(),
            private_rows: private.row_count(),
            joined,
        });
    }
    tracing::debug!(rows = joined.row_count(), columns = joined.column_names().len(), "joined tables");
    Ok(joined)
}

fn trimmed(frame: &Frame, side: Side) -> Result<Frame> {
    let mut frame = frame.clone();
    frame
        .rename_columns(|name| name.trim().to_string())
        .map_err(|source| CoreError::Frame { side, source })?;

    for key in columns::KEY {
        if !frame.has_column(key) {
            return Err(CoreError::Schema { side, message: format!("missing join column '{}'", key) });
        }
    }
    Ok(frame)
}

/// One entry per row; `None` where the country is blank or the year is not
/// an integer.
fn extract_keys(frame: &Frame, side: Side) -> Result<Vec<Option<JoinKey>>> {
    let countries = frame.column(columns::COUNTRY).unwrap_or_default();
    let years = frame.column(columns::YEAR).unwrap_or_default();

    let mut keys = Vec::with_capacity(frame.row_count());
    let mut seen: HashMap<JoinKey, usize> = HashMap::with_capacity(frame.row_count());
    for (row, (country, year)) in countries.iter().zip(years).enumerate() {
        let (Some(country), Some(year)) = (country.as_text(), year.as_year()) else {
            tracing::debug!(%side, row, "unreadable join key");
            keys.push(None);
            continue;
        };

        let key = JoinKey::new(country, year);
        if let Some(&first_row) = seen.get(&key) {
            return Err(CoreError::DuplicateKey { side, key, first_row, second_row: row });
        }
        seen.insert(key.clone(), row);
        keys.push(Some(key));
    }
    Ok(keys)
}

fn assemble(
    public: &Frame,
    private: &Frame,
    public_keys: &[Option<JoinKey>],
    matches: &[(usize, usize)],
) -> std::result::Result<Frame, FrameError> {
    // Every matched public row has a readable key.
    let matched_keys: Vec<&JoinKey> = matches.iter().filter_map(|&(p, _)| public_keys[p].as_ref()).collect();
    let is_key = |name: &str| columns::KEY.contains(&name);
    let public_names: HashSet<&str> = public.column_names().iter().map(String::as_str).collect();
    let private_names: HashSet<&str> = private.column_names().iter().map(String::as_str).collect();

    let mut out = Frame::new();
    out.push_column(
        columns::COUNTRY,
        matched_keys.iter().map(|key| Cell::Text(key.country.clone())).collect(),
    )?;
    out.push_column(
        columns::YEAR,
        matched_keys.iter().map(|key| Cell::Number(key.year as f64)).collect(),
    )?;

    for (name, cells) in public.columns().filter(|(name, _)| !is_key(*name)) {
        let out_name = if private_names.contains(name) {
            format!("{}{}", name, PUBLIC_SUFFIX)
        } else {
            name.to_string()
        };
        out.push_column(out_name, matches.iter().map(|&(p, _)| cells[p].clone()).collect())?;
    }

    for (name, cells) in private.columns().filter(|(name, _)| !is_key(*name)) {
        let out_name = if public_names.contains(name) {
            format!("{}{}", name, PRIVATE_SUFFIX)
        } else {
            name.to_string()
        };
        out.push_column(out_name, matches.iter().map(|&(_, q)| cells[q].clone()).collect())?;
    }

    Ok(out)
}
