//! Endpoint groups, each an `impl Spotify` block.

pub mod player;
pub mod playlists;
pub mod search;
pub mod tracks;
pub mod users;

use tracing::debug;

/// Join at most `max` ids with commas. Extra ids are dropped.
pub(crate) fn join_ids<S: AsRef<str>>(ids: &[S], max: usize) -> String {
    if ids.len() > max {
        debug!(given = ids.len(), max, "truncating id list");
    }
    ids.iter()
        .take(max)
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_ids_truncates() {
        let ids: Vec<String> = (0..60).map(|i| format!("id{i}")).collect();
        let joined = join_ids(&ids, 50);
        assert_eq!(joined.split(',').count(), 50);
        assert!(joined.starts_with("id0,id1,"));
        assert!(joined.ends_with(",id49"));
    }

    #[test]
    fn join_ids_keeps_short_lists() {
        assert_eq!(join_ids(&["a", "b"], 50), "a,b");
        assert_eq!(join_ids::<&str>(&[], 50), "");
    }
}
