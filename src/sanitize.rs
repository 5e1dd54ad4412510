//! Quote stripping for environment-supplied values

use crate::error::{BindingError, Result};

/// Strip one pair of matching surrounding quotes
///
/// `'x'` and `"x"` become `x`; mismatched quotes are left alone. Only called
/// on values already known to be present, so an empty input is an error.
pub fn sanitize(data: &str) -> Result<String> {
    let (Some(first), Some(last)) = (data.chars().next(), data.chars().next_back()) else {
        return Err(BindingError::InvalidString {
            value: data.to_string(),
        });
    };

    if (first == '"' || first == '\'') && first == last && data.len() >= 2 {
        return Ok(data[1..data.len() - 1].to_string());
    }
    Ok(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_quotes() {
        assert_eq!(sanitize("'quoted-value'").unwrap(), "quoted-value");
        assert_eq!(sanitize("\"quoted-value\"").unwrap(), "quoted-value");
        assert_eq!(sanitize("''").unwrap(), "");
    }

    #[test]
    fn leaves_other_values_alone() {
        assert_eq!(sanitize("no-quotes").unwrap(), "no-quotes");
        assert_eq!(sanitize("'x\"").unwrap(), "'x\"");
        assert_eq!(sanitize("'inner'quote").unwrap(), "'inner'quote");
    }

    #[test]
    fn lone_quote_is_kept() {
        assert_eq!(sanitize("'").unwrap(), "'");
    }

    #[test]
    fn empty_is_a_contract_violation() {
        assert!(matches!(sanitize(""), Err(BindingError::InvalidString { .. })));
    }
}
