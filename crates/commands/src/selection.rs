//! Selection expressions for approve/deny.
//!
//! Displayed transaction ids are 1-based positions within the pending items
//! the viewer may see, not stored identifiers. Resolution therefore works in
//! two passes: the expression is resolved against the viewer-visible
//! sublist, then each visible position is mapped back to its global index in
//! the full pending queue.

use std::collections::BTreeSet;

use engine::Campaign;

use crate::CommandError;

/// Resolves a comma-separated selection expression (`last`, `all`, 1-based
/// ids, inclusive `a-b` ranges) into sorted, deduplicated global pending
/// indices for the given viewer.
pub(crate) fn resolve(
    campaign: &Campaign,
    viewer: u64,
    expression: &str,
) -> Result<Vec<usize>, CommandError> {
    let visible = campaign.visible_pending(viewer);

    let mut positions: BTreeSet<usize> = BTreeSet::new();
    for term in expression.split(',') {
        let term = term.trim();
        match term {
            "all" => positions.extend(0..visible.len()),
            "last" => {
                if !visible.is_empty() {
                    positions.insert(visible.len() - 1);
                }
            }
            _ => match term.split_once('-') {
                None => {
                    positions.insert(parse_position(term, visible.len())?);
                }
                Some((start, end)) => {
                    let first = parse_id(start)?;
                    let last = parse_id(end)?;
                    if first >= last {
                        return Err(CommandError::UnorderedRange(term.to_string()));
                    }
                    if first < 1 {
                        return Err(CommandError::InvalidId(start.to_string()));
                    }
                    if last > visible.len() as u64 {
                        return Err(CommandError::InvalidId(end.to_string()));
                    }
                    positions.extend((first - 1) as usize..last as usize);
                }
            },
        }
    }

    Ok(positions
        .into_iter()
        .map(|position| visible[position].0)
        .collect())
}

fn parse_id(raw: &str) -> Result<u64, CommandError> {
    raw.trim().parse().map_err(|_| CommandError::Syntax)
}

fn parse_position(raw: &str, visible_len: usize) -> Result<usize, CommandError> {
    let id = parse_id(raw)?;
    if id < 1 || id > visible_len as u64 {
        return Err(CommandError::InvalidId(raw.trim().to_string()));
    }
    Ok((id - 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Mode, Purse, Transaction};

    /// Five pending items; the viewer (id 5) is participant on the 2nd and
    /// 4th only, so exactly those are visible to a non-GM.
    fn campaign() -> Campaign {
        let mut campaign = Campaign::new(100, 1);
        campaign.register(1, "Alice").unwrap();
        campaign.register(5, "Eve").unwrap();
        for index in 0..5u64 {
            let participant = if index % 2 == 1 { Some(5) } else { None };
            campaign.propose(Transaction::new(
                1,
                Mode::Give,
                Purse::from_copper(100),
                participant,
                None,
            ));
        }
        campaign
    }

    #[test]
    fn all_resolves_to_every_visible_item() {
        assert_eq!(resolve(&campaign(), 5, "all").unwrap(), vec![1, 3]);
    }

    #[test]
    fn last_resolves_to_highest_visible_item() {
        assert_eq!(resolve(&campaign(), 5, "last").unwrap(), vec![3]);
    }

    #[test]
    fn range_covers_visible_positions() {
        assert_eq!(resolve(&campaign(), 5, "1-2").unwrap(), vec![1, 3]);
    }

    #[test]
    fn gm_sees_the_whole_queue() {
        assert_eq!(resolve(&campaign(), 1, "all").unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(resolve(&campaign(), 1, "2-4, 1").unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn terms_combine_and_deduplicate() {
        assert_eq!(resolve(&campaign(), 5, "1, last, 2").unwrap(), vec![1, 3]);
    }

    #[test]
    fn out_of_bounds_id_cites_the_literal() {
        let err = resolve(&campaign(), 5, "3").unwrap_err();
        assert!(matches!(err, CommandError::InvalidId(id) if id == "3"));

        let err = resolve(&campaign(), 5, "1-7").unwrap_err();
        assert!(matches!(err, CommandError::InvalidId(id) if id == "7"));

        let err = resolve(&campaign(), 5, "0").unwrap_err();
        assert!(matches!(err, CommandError::InvalidId(id) if id == "0"));
    }

    #[test]
    fn unordered_range_is_rejected() {
        let err = resolve(&campaign(), 5, "5-2").unwrap_err();
        assert!(matches!(err, CommandError::UnorderedRange(term) if term == "5-2"));

        let err = resolve(&campaign(), 5, "2-2").unwrap_err();
        assert!(matches!(err, CommandError::UnorderedRange(term) if term == "2-2"));
    }

    #[test]
    fn non_numeric_term_is_a_syntax_error() {
        assert!(matches!(
            resolve(&campaign(), 5, "first"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(
            resolve(&campaign(), 5, "1, x-2"),
            Err(CommandError::Syntax)
        ));
    }

    #[test]
    fn empty_queue_keywords_resolve_to_nothing() {
        let campaign = Campaign::new(100, 1);
        assert!(resolve(&campaign, 1, "all").unwrap().is_empty());
        assert!(resolve(&campaign, 1, "last").unwrap().is_empty());
    }
}
