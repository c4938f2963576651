use crate::{DocId, InvertedIndex, Posting, TermId};

/// How a query term with no postings affects a conjunction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTerms {
    /// Drop the term from the requirement; the other terms still have to match.
    #[default]
    Ignore,
    /// No document can satisfy the query.
    Unsatisfiable,
}

/// Documents containing every distinct query term, in ascending doc id order.
pub fn conjunction(inverted: &InvertedIndex, terms: &[TermId], policy: MissingTerms) -> Vec<DocId> {
    let mut distinct = terms.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    let mut lists: Vec<&[Posting]> = Vec::with_capacity(distinct.len());
    for tid in distinct {
        match inverted.postings(tid) {
            Some(list) => lists.push(list),
            None if policy == MissingTerms::Unsatisfiable => return Vec::new(),
            None => {}
        }
    }
    if lists.is_empty() {
        return Vec::new();
    }

    lists.sort_by_key(|l| l.len());
    let mut result: Vec<DocId> = lists[0].iter().map(|p| p.doc_id).collect();
    for list in &lists[1..] {
        if result.is_empty() {
            break;
        }
        result = intersect(&result, list);
    }
    result
}

/// Merge-intersect two doc-id-ascending sequences.
fn intersect(docs: &[DocId], list: &[Posting]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(docs.len().min(list.len()));
    let (mut i, mut j) = (0, 0);
    while i < docs.len() && j < list.len() {
        let (a, b) = (docs[i], list[j].doc_id);
        if a == b {
            out.push(a);
            i += 1;
            j += 1;
        } else if a < b {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverted(lists: &[&[DocId]]) -> InvertedIndex {
        let mut inv = InvertedIndex::new();
        for (tid, docs) in lists.iter().enumerate() {
            for &doc_id in *docs {
                inv.push(tid as TermId, Posting { doc_id, tf: 1 });
            }
        }
        inv
    }

    #[test]
    fn intersects_all_terms() {
        let inv = inverted(&[&[0, 2, 4, 6], &[1, 2, 3, 6], &[2, 5, 6, 9]]);
        assert_eq!(conjunction(&inv, &[0, 1, 2], MissingTerms::Ignore), vec![2, 6]);
        assert_eq!(conjunction(&inv, &[0, 1], MissingTerms::Ignore), vec![2, 6]);
        assert_eq!(conjunction(&inv, &[2], MissingTerms::Ignore), vec![2, 5, 6, 9]);
    }

    #[test]
    fn duplicate_terms_count_once() {
        let inv = inverted(&[&[0, 1], &[1]]);
        assert_eq!(conjunction(&inv, &[0, 0, 1, 0], MissingTerms::Ignore), vec![1]);
    }

    #[test]
    fn missing_term_policy() {
        let inv = inverted(&[&[0, 1], &[1, 3]]);
        assert_eq!(conjunction(&inv, &[0, 1, 42], MissingTerms::Ignore), vec![1]);
        assert!(conjunction(&inv, &[0, 1, 42], MissingTerms::Unsatisfiable).is_empty());
        assert!(conjunction(&inv, &[42], MissingTerms::Ignore).is_empty());
        assert!(conjunction(&inv, &[], MissingTerms::Ignore).is_empty());
    }
}
