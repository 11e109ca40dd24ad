/// Strip markdown code fences from LLM responses.
pub fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = s.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_json() {
        assert_eq!(
            strip_code_fences("```json\n{\"kind\": \"bar\"}\n```"),
            "{\"kind\": \"bar\"}"
        );
    }

    #[test]
    fn test_strip_code_fences_plain() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_strip_code_fences_none() {
        assert_eq!(strip_code_fences("{\"kind\": \"bar\"}"), "{\"kind\": \"bar\"}");
    }

    #[test]
    fn test_strip_code_fences_whitespace() {
        assert_eq!(strip_code_fences("  ```json\n{}\n```  "), "{}");
    }
}
