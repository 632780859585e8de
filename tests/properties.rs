use proptest::prelude::*;
use rustpubmed::dedup::filter_new;
use rustpubmed::query::{clean_term, SearchUrlBuilder, DEFAULT_SEARCH_BASE};
use std::collections::HashSet;
use url::Url;

fn pmids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[0-9]{1,3}", 0..40)
}

proptest! {
    #[test]
    fn test_filter_new_drops_exactly_the_known(
        candidates in pmids(),
        known in prop::collection::hash_set("[0-9]{1,3}", 0..40),
    ) {
        let out = filter_new(&candidates, &known);

        prop_assert!(out.iter().all(|id| !known.contains(id)));
        let overlap = candidates.iter().filter(|c| known.contains(*c)).count();
        prop_assert_eq!(out.len(), candidates.len() - overlap);
    }

    #[test]
    fn test_filter_new_keeps_relative_order(
        candidates in pmids(),
        known in prop::collection::hash_set("[0-9]{1,3}", 0..40),
    ) {
        let out = filter_new(&candidates, &known);

        // Survivors form a subsequence of the candidates.
        let mut rest = candidates.iter();
        for id in &out {
            prop_assert!(rest.any(|c| c == id), "{} out of order", id);
        }
    }

    #[test]
    fn test_filter_new_with_nothing_known(candidates in pmids()) {
        prop_assert_eq!(filter_new(&candidates, &HashSet::new()), candidates);
    }

    #[test]
    fn test_search_url_decodes_to_inputs(
        term in "\\PC{0,40}",
        filters in prop::collection::vec("\\PC{0,15}", 0..4),
        page_size in 1usize..1000,
    ) {
        let url = SearchUrlBuilder::new(DEFAULT_SEARCH_BASE).build(&term, &filters, page_size);
        let suffix = format!("&size={}", page_size);
        prop_assert!(url.ends_with(&suffix));

        let parsed = Url::parse(&url).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        prop_assert_eq!(&pairs[0], &("term".to_string(), clean_term(&term)));
        let decoded_filters: Vec<String> = pairs
            .iter()
            .filter(|(k, _)| k == "filter")
            .map(|(_, v)| v.clone())
            .collect();
        prop_assert_eq!(decoded_filters, filters);
        prop_assert_eq!(
            pairs.last().cloned(),
            Some(("size".to_string(), page_size.to_string()))
        );
    }
}
