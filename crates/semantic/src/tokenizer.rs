use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static BLOCK_COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)(//|#).*$").unwrap());
static DOUBLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(?:[^"\\]|\\.)*""#).unwrap());
static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"'(?:[^'\\]|\\.)*'").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|[0-9]+(?:\.[0-9]+)?").unwrap());

/// Language keywords kept verbatim.
static LANGUAGE_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "function", "class", "return", "if", "else", "for", "foreach", "while", "do", "switch",
        "case", "break", "continue", "try", "catch", "finally", "new", "public", "private",
        "protected", "static", "void", "int", "float", "double", "string", "bool", "array",
        "true", "false", "null",
    ]
    .into_iter()
    .collect()
});

/// Test-semantics keywords kept verbatim (lower-cased comparison).
static TEST_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "success", "fail", "failure", "error", "exception", "valid", "invalid", "empty",
        "missing", "found", "create", "update", "delete", "authorized", "unauthorized",
        "expect", "assert", "throw", "mock", "stub", "spy", "fake", "fixture", "setup",
        "teardown",
    ]
    .into_iter()
    .collect()
});

/// Variable names that carry test intent on their own.
static MEANINGFUL_VARIABLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "password", "user", "email", "id", "status", "response", "request", "token", "name",
        "data", "result", "count", "total", "amount", "order", "payment", "account", "role",
        "session", "config", "query",
    ]
    .into_iter()
    .collect()
});

/// Tokenizes one test into its normalized token bag.
///
/// The synthetic `test_method <method>` marker tokens are always emitted so
/// the method name contributes even when no body can be located. When the
/// source has no matching `function <method>(` declaration the document
/// degenerates to the class-plus-method string.
pub fn tokenize_document(source: &str, method: &str, class_name: &str) -> Vec<String> {
    let body = extract_method_body(source, method)
        .unwrap_or_else(|| format!("{class_name} {method}"));
    let cleaned = clean_source(&body);

    let mut tokens = vec!["test_method".to_string(), method.to_ascii_lowercase()];
    tokens.extend(extract_tokens(&cleaned));
    tokens
}

/// Strips comments, blanks string literals, collapses whitespace.
fn clean_source(source: &str) -> String {
    let source = BLOCK_COMMENTS.replace_all(source, " ");
    let source = LINE_COMMENTS.replace_all(&source, " ");
    let source = DOUBLE_QUOTED.replace_all(&source, "\"\"");
    let source = SINGLE_QUOTED.replace_all(&source, "''");
    WHITESPACE.replace_all(&source, " ").into_owned()
}

/// Finds `function <method>(` and walks balanced braces to the body's end.
fn extract_method_body(source: &str, method: &str) -> Option<String> {
    let needle = format!("function {method}(");
    let start = source.find(&needle)?;
    let after = &source[start..];
    let open = after.find('{')?;

    let mut depth = 0usize;
    for (offset, ch) in after[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(after[open + 1..open + offset].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn is_pascal_case(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_uppercase()
        && token.chars().any(|c| c.is_ascii_lowercase())
        && !token.contains('_')
}

/// Applies the keep rules to each word-boundary token. A token matching more
/// than one rule contributes once per rule, in rule order.
fn extract_tokens(cleaned: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let bytes = cleaned.as_bytes();

    for word in WORD.find_iter(cleaned) {
        let token = word.as_str();
        let lower = token.to_ascii_lowercase();

        if token.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            tokens.push("num".to_string());
            continue;
        }

        if LANGUAGE_KEYWORDS.contains(lower.as_str()) {
            tokens.push(lower.clone());
        }
        if TEST_KEYWORDS.contains(lower.as_str()) {
            tokens.push(lower.clone());
        }

        let followed_by_paren = bytes
            .get(word.end()..)
            .and_then(|rest| rest.iter().find(|b| !b.is_ascii_whitespace()))
            .is_some_and(|&b| b == b'(');
        if followed_by_paren {
            tokens.push(format!("call_{lower}"));
        }

        if lower.contains("assert") || lower.contains("expect") {
            tokens.push(lower.clone());
        }

        if is_pascal_case(token) {
            tokens.push(format!("class_{lower}"));
        }

        if MEANINGFUL_VARIABLES.contains(lower.as_str()) {
            tokens.push(lower.clone());
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        class UserServiceTest {
            public function test_creates_user() {
                // seed the database
                $user = UserFactory::make("alice");
                $response = $this->post('/users', $user);
                $this->assertEquals(201, $response->status());
            }

            public function test_other() {
                $this->assertTrue(true);
            }
        }
    "#;

    #[test]
    fn marker_always_contributes() {
        let tokens = tokenize_document("", "test_login", "AuthTest");
        assert_eq!(tokens[0], "test_method");
        assert_eq!(tokens[1], "test_login");
        assert!(tokens.contains(&"class_authtest".to_string()));
    }

    #[test]
    fn extracts_only_the_named_method_body() {
        let tokens = tokenize_document(SOURCE, "test_creates_user", "UserServiceTest");
        assert!(tokens.contains(&"call_assertequals".to_string()));
        assert!(tokens.contains(&"assertequals".to_string()));
        // Body of test_other must not leak in.
        assert!(!tokens.contains(&"asserttrue".to_string()));
    }

    #[test]
    fn comments_and_strings_are_stripped() {
        let tokens = tokenize_document(SOURCE, "test_creates_user", "UserServiceTest");
        assert!(!tokens.contains(&"seed".to_string()));
        assert!(!tokens.contains(&"alice".to_string()));
    }

    #[test]
    fn pascal_case_becomes_class_token() {
        let tokens = tokenize_document(SOURCE, "test_creates_user", "UserServiceTest");
        assert!(tokens.contains(&"class_userfactory".to_string()));
    }

    #[test]
    fn numbers_collapse_to_num() {
        let tokens = tokenize_document(SOURCE, "test_creates_user", "UserServiceTest");
        assert!(tokens.contains(&"num".to_string()));
        assert!(!tokens.contains(&"201".to_string()));
    }

    #[test]
    fn meaningful_variables_are_kept() {
        let tokens = tokenize_document(SOURCE, "test_creates_user", "UserServiceTest");
        assert!(tokens.contains(&"user".to_string()));
        assert!(tokens.contains(&"response".to_string()));
    }

    #[test]
    fn missing_body_degenerates_to_class_and_method() {
        let tokens = tokenize_document("not a match", "test_gone", "OrderTest");
        assert!(tokens.contains(&"class_ordertest".to_string()));
        // The synthetic marker still mentions the method via the call rule or
        // plain identifier rules; the bag must not be empty.
        assert!(!tokens.is_empty());
    }

    #[test]
    fn nested_braces_stay_balanced() {
        let source = r#"
            function test_nested() {
                if (true) { foo(); { bar(); } }
                $this->assertSame(1, 1);
            }
            function test_after() { baz(); }
        "#;
        let tokens = tokenize_document(source, "test_nested", "T");
        assert!(tokens.contains(&"call_foo".to_string()));
        assert!(tokens.contains(&"call_bar".to_string()));
        assert!(tokens.contains(&"assertsame".to_string()));
        assert!(!tokens.contains(&"call_baz".to_string()));
    }
}
