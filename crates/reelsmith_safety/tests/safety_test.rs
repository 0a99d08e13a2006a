//! Tests for the content filter and TTS cleaner.

use reelsmith_safety::{ContentFilter, ContentFilterConfig, TermReplacement, TtsCleaner, TtsCleanerConfig};

fn filter() -> ContentFilter {
    ContentFilter::new(ContentFilterConfig {
        forbidden_terms: vec!["blood".to_string(), "血腥".to_string()],
        replacements: vec![
            TermReplacement {
                term: "murdered".to_string(),
                replacement: "struck down".to_string(),
            },
            TermReplacement {
                term: "杀死".to_string(),
                replacement: "击败".to_string(),
            },
        ],
        stripped_terms: vec!["damn".to_string(), "xx".to_string()],
    })
    .unwrap()
}

#[test]
fn test_filter_is_idempotent() {
    let filter = filter();
    let samples = [
        "He MURDERED the king.  Damn it.\n\n\n\nBlood on the floor.",
        "他杀死了   敌人，血腥的夜晚。",
        "  xxx  leading and trailing  \t ",
        "dxxamn stays tricky",
        "",
    ];
    for sample in samples {
        let once = filter.filter(sample).text;
        let twice = filter.filter(&once).text;
        assert_eq!(once, twice, "input: {sample:?}");
    }
}

#[test]
fn test_nested_strip_settles_in_one_call() {
    let filter = ContentFilter::new(ContentFilterConfig {
        stripped_terms: vec!["ab".into()],
        ..Default::default()
    })
    .unwrap();
    // Each pass removes only the innermost "ab", exposing the next one.
    let input = format!("{}{}", "a".repeat(10), "b".repeat(10));
    let once = filter.filter(&input);
    assert_eq!(once.text, "");
    assert_eq!(once.stripped, 10);
    assert_eq!(filter.filter(&once.text).text, once.text);
    assert_eq!(filter.filter("aabb").text, "");
}

#[test]
fn test_stripping_that_exposes_a_term_settles() {
    let filter = filter();
    // Removing "xx" joins "d" and "amn" into a stripped term.
    let outcome = filter.filter("oh dxxamn");
    assert_eq!(outcome.text, "oh");
    assert_eq!(outcome.stripped, 2);
}

#[test]
fn test_forbidden_terms_flag_without_blocking() {
    let outcome = filter().filter("Blood and more blood.");
    assert_eq!(outcome.flagged, vec!["blood".to_string()]);
    assert_eq!(outcome.text, "Blood and more blood.");
    assert!(!outcome.is_clean());
}

#[test]
fn test_substitution_is_case_insensitive() {
    let outcome = filter().filter("They were Murdered at dawn.");
    assert_eq!(outcome.text, "They were struck down at dawn.");
    assert_eq!(outcome.replaced, 1);
}

#[test]
fn test_replacement_reintroducing_term_rejected() {
    let result = ContentFilter::new(ContentFilterConfig {
        forbidden_terms: vec![],
        replacements: vec![TermReplacement {
            term: "bad".to_string(),
            replacement: "very bad".to_string(),
        }],
        stripped_terms: vec![],
    });
    assert!(result.is_err());
}

#[test]
fn test_config_from_toml_defaults() {
    let config: ContentFilterConfig = toml::from_str(r#"stripped_terms = ["x"]"#).unwrap();
    assert!(config.forbidden_terms.is_empty());
    assert!(config.replacements.is_empty());
    assert_eq!(config.stripped_terms, vec!["x".to_string()]);
}

#[test]
fn test_tts_cleaner_removes_all_brackets() {
    let cleaner = TtsCleaner::new(TtsCleanerConfig::default()).unwrap();
    let samples = [
        "Hello (aside (nested)) world",
        "【旁白】很久以前（笑）",
        "unbalanced ) and [ and （ and 】 marks",
        "[a](b)【c】（d）",
        "**bold** narration",
    ];
    for sample in samples {
        let cleaned = cleaner.clean(sample);
        for bracket in ['(', ')', '[', ']', '（', '）', '【', '】', '*'] {
            assert!(!cleaned.contains(bracket), "{sample:?} -> {cleaned:?}");
        }
    }
}

#[test]
fn test_tts_cleaner_collapses_whitespace() {
    let cleaner = TtsCleaner::new(TtsCleanerConfig::default()).unwrap();
    assert_eq!(cleaner.clean("  one [beat]\n\n two  "), "one two");
    assert_eq!(cleaner.clean("【旁白】很久以前（笑）"), "很久以前");
}
