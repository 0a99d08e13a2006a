//! Tests for chapter splitting, timing alignment and subtitle rendering.

use reelsmith_core::WordTiming;
use reelsmith_text::{
    SubtitleOptions, build_char_timings, build_subtitle_cues, render_srt, split_chapters,
};

const STORY: &str = "Chapter one begins in the rain.\n\
The ferry was late again.\n\
\n\
Mara counted the lanterns on the pier.\n\
一盏，两盏，三盏。\n\
By midnight the harbor was empty.\n\
Only the gulls stayed.\n\
And the tide came in without a sound.";

#[test]
fn test_split_rejoin_reconstructs_text() {
    for count in 1..=10 {
        let chapters = split_chapters(STORY, count).unwrap();
        assert_eq!(chapters.concat(), STORY, "count {count}");
        assert!(chapters.len() <= count);
        assert!(chapters.iter().all(|c| !c.is_empty()));
    }
}

#[test]
fn test_split_is_deterministic() {
    assert_eq!(
        split_chapters(STORY, 3).unwrap(),
        split_chapters(STORY, 3).unwrap()
    );
}

#[test]
fn test_split_balances_lengths() {
    let line = "x".repeat(20);
    let text = vec![line.as_str(); 12].join("\n");
    let chapters = split_chapters(&text, 3).unwrap();
    assert_eq!(chapters.len(), 3);
    let lens: Vec<usize> = chapters.iter().map(|c| c.lines().count()).collect();
    assert_eq!(lens, vec![4, 4, 4]);
}

#[test]
fn test_split_preserves_crlf() {
    let text = "a\r\nb\r\nc\r\nd";
    let chapters = split_chapters(text, 2).unwrap();
    assert_eq!(chapters.concat(), text);
}

#[test]
fn test_char_timings_cover_word_span() {
    let words = vec![
        WordTiming::new("hello", 0.0, 1.0),
        WordTiming::new("you", 1.2, 1.5),
    ];
    let chars = build_char_timings(&words);
    assert_eq!(chars.len(), 8);
    assert_eq!(chars[0].start_time, 0.0);
    assert!((chars[0].end_time - 0.2).abs() < 1e-9);
    assert_eq!(chars[4].end_time, 1.0);
    assert_eq!(chars[5].start_time, 1.2);
    assert_eq!(chars[7].end_time, 1.5);
    for pair in chars.windows(2) {
        assert!(pair[0].start_time <= pair[1].start_time);
    }
}

#[test]
fn test_cues_break_on_length() {
    let chars = build_char_timings(&[WordTiming::new("abcdefghij", 0.0, 1.0)]);
    let cues = build_subtitle_cues("", &chars, None, &SubtitleOptions::new(4, true));
    let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
}

#[test]
fn test_cues_estimated_without_timings() {
    let cues = build_subtitle_cues(
        "风起了。雨落下。",
        &[],
        Some(4.0),
        &SubtitleOptions::default(),
    );
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "风起了");
    assert_eq!(cues[1].end, 4.0);
}

#[test]
fn test_render_srt_numbering() {
    let chars = build_char_timings(&[WordTiming::new("hi.", 0.0, 0.9)]);
    let cues = build_subtitle_cues("", &chars, None, &SubtitleOptions::default());
    let srt = render_srt(&cues);
    assert_eq!(srt, "1\n00:00:00,000 --> 00:00:00,900\nhi\n\n");
}
