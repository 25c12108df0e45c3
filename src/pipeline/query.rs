//! Query building: [`CardRequest`] → Scryfall search text + options.

use crate::pipeline::parse::CardRequest;
use crate::search::{SearchOptions, UniqueMode};

/// Exact-name query, scoped to one set when the request names one.
///
/// `!"<name>"` matches the full card name exactly across all printings;
/// `set:<code>` narrows that to a single set.
pub fn build_query(request: &CardRequest) -> String {
    match &request.set_code {
        Some(set) => format!("!\"{}\" set:{}", request.name, set),
        None => format!("!\"{}\"", request.name),
    }
}

/// Search options for a request.
///
/// The token flag never appears in the query text: it only switches on
/// `include_extras`, so token printings come back only when asked for.
pub fn search_options(request: &CardRequest, unique: UniqueMode) -> SearchOptions {
    SearchOptions {
        include_extras: request.is_token,
        unique,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenPrefix;
    use crate::pipeline::parse::parse_line;

    #[test]
    fn set_scoped_query() {
        let req = parse_line("4x Lightning Bolt (LEA)", TokenPrefix::Any).unwrap();
        assert_eq!(build_query(&req), r#"!"Lightning Bolt" set:LEA"#);
        assert!(!search_options(&req, UniqueMode::Prints).include_extras);
    }

    #[test]
    fn token_query_uses_extras_flag_only() {
        let req = parse_line("t:Elf Warrior", TokenPrefix::Any).unwrap();
        assert_eq!(build_query(&req), r#"!"Elf Warrior""#);

        let opts = search_options(&req, UniqueMode::Art);
        assert!(opts.include_extras);
        assert_eq!(opts.unique, UniqueMode::Art);
    }
}
