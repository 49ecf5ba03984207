//! Page order parsing

/// Parse a comma-separated list of 1-based page numbers into 0-based indices
///
/// Tokens that are not plain digits, or that fall outside `1..=page_count`,
/// are dropped. Duplicates are kept so a page can be repeated. An empty
/// result means "leave the document unchanged".
pub fn parse_page_order(order: &str, page_count: usize) -> Vec<usize> {
    order
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<usize>().ok())
        .filter(|&page| page >= 1 && page <= page_count)
        .map(|page| page - 1)
        .collect()
}
