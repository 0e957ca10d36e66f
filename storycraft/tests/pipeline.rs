use std::sync::Arc;

use llm::{MockCompleter, Role};
use storycraft::{
    GenerationOptions, Pipeline, PipelineSettings, StoryError, StoryType, StoryUnit, UnitKind,
    pipeline::{SPLIT_PARAMS, SUMMARY_THRESHOLD_WORDS},
};

fn pipeline(mock: &Arc<MockCompleter>) -> Pipeline<Arc<MockCompleter>> {
    Pipeline::new(mock.clone(), PipelineSettings::default())
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[tokio::test]
async fn generates_story_from_ranked_units() {
    let mock = Arc::new(MockCompleter::new(vec!["  The river rose.  ".into()]));
    let units = vec![
        StoryUnit::new(UnitKind::Background, "Riverbend sits on the Missouri."),
        StoryUnit::new(UnitKind::Quote, "\"We lost everything.\"").with_priority(1),
    ];
    let story = pipeline(&mock)
        .generate_story(units, StoryType::Article, &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(story.story, "The river rose.");
    assert_eq!(story.story_type, StoryType::Article);
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4o");
    assert_eq!(requests[0].max_tokens, Some(800));
    let prompt = requests[0].prompt().unwrap();
    assert!(prompt.find("We lost everything").unwrap() < prompt.find("Riverbend").unwrap());
    assert_eq!(story.units[0].kind, UnitKind::Quote);
    assert_eq!(story.units[1].kind, UnitKind::Background);
}

#[tokio::test]
async fn condenses_long_low_ranked_units() {
    let mock = Arc::new(MockCompleter::new(vec![
        "short summary".into(),
        "final story".into(),
    ]));
    let long = words(200);
    let units = vec![
        StoryUnit::new(UnitKind::Note, long.clone()).with_priority(2),
        StoryUnit::new(UnitKind::Quote, "Top quote").with_priority(1),
    ];
    let opts = GenerationOptions {
        max_length: Some(300),
        ..Default::default()
    };
    let story = pipeline(&mock)
        .generate_story(units, StoryType::Blog, &opts)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    // share is 150 words; the second ranked unit gets 150 - 10 + 10
    assert!(requests[0].prompt().unwrap().starts_with("Summarize this text in under 150 words."));
    assert_eq!(story.units[1].content, "short summary");
    assert_eq!(story.units[1].original_content.as_deref(), Some(long.as_str()));
    assert!(requests[1].prompt().unwrap().contains("short summary"));
    assert_eq!(story.story, "final story");
}

#[tokio::test]
async fn high_ranked_units_are_never_condensed() {
    let mock = Arc::new(MockCompleter::new(vec!["story".into()]));
    let units = vec![
        StoryUnit::new(UnitKind::Note, words(500)).with_priority(1),
        StoryUnit::new(UnitKind::Quote, "short").with_priority(2),
    ];
    let opts = GenerationOptions {
        max_length: Some(100),
        ..Default::default()
    };
    pipeline(&mock)
        .generate_story(units, StoryType::Article, &opts)
        .await
        .unwrap();
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn rejects_invalid_generation_requests() {
    let mock = Arc::new(MockCompleter::new(vec!["story".into()]));
    let p = pipeline(&mock);
    let err = p
        .generate_story(vec![], StoryType::Article, &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));

    let opts = GenerationOptions {
        min_length: Some(900),
        max_length: Some(100),
        ..Default::default()
    };
    let err = p
        .generate_story(
            vec![StoryUnit::new(UnitKind::Note, "x")],
            StoryType::Article,
            &opts,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn provider_failures_surface_as_completion_errors() {
    let mock = Arc::new(MockCompleter::failing("connection refused"));
    let err = pipeline(&mock)
        .generate_story(
            vec![StoryUnit::new(UnitKind::Note, "x")],
            StoryType::Social,
            &GenerationOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoryError::Completion(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn edit_uses_editor_system_prompt() {
    let mock = Arc::new(MockCompleter::new(vec!["Edited.".into()]));
    let units = vec![StoryUnit::new(UnitKind::Quote, "quote").with_priority(1)];
    let edited = pipeline(&mock)
        .edit_story("Original.", "Make it shorter", &units)
        .await
        .unwrap();
    assert_eq!(edited.original_story, "Original.");
    assert_eq!(edited.edited_story, "Edited.");
    assert_eq!(edited.edit_instructions, "Make it shorter");

    let req = &mock.requests()[0];
    assert_eq!(req.messages[0].role, Role::System);
    assert_eq!(req.model, "gpt-4o-mini");
    assert_eq!(req.temperature, Some(0.7));
    assert_eq!(req.max_tokens, Some(2000));
}

#[tokio::test]
async fn edit_requires_instructions() {
    let mock = Arc::new(MockCompleter::new(vec!["Edited.".into()]));
    let err = pipeline(&mock)
        .edit_story("Original.", " ", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));
}

#[tokio::test]
async fn splits_interview_into_pairs() {
    let mock = Arc::new(MockCompleter::new(vec![
        "```json\n[{\"question\":\"Where were you?\",\"answer\":\"At home.\"}]\n```".into(),
    ]));
    let pairs = pipeline(&mock)
        .split_interview("Q: Where were you? A: At home.")
        .await
        .unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].question, "Where were you?");
    let req = &mock.requests()[0];
    assert_eq!(req.temperature, SPLIT_PARAMS.temperature);
}

#[tokio::test]
async fn malformed_split_is_a_parse_error() {
    let mock = Arc::new(MockCompleter::new(vec!["Sure! Here you go.".into()]));
    let err = pipeline(&mock)
        .split_interview("Q: hi A: hello")
        .await
        .unwrap_err();
    match err {
        StoryError::Parse { raw, .. } => assert_eq!(raw, "Sure! Here you go."),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn summarize_returns_trimmed_text() {
    let mock = Arc::new(MockCompleter::new(vec!["\nA summary.\n".into()]));
    let summary = pipeline(&mock).summarize("long text").await.unwrap();
    assert_eq!(summary, "A summary.");
    assert!(mock
        .last_prompt()
        .unwrap()
        .contains("100 words or less"));
}

#[tokio::test]
async fn process_unit_routes_by_kind_and_length() {
    let mock = Arc::new(MockCompleter::new(vec![
        "[{\"question\":\"q\",\"answer\":\"a\"}]".into(),
        "condensed".into(),
    ]));
    let p = pipeline(&mock);

    let interview = p
        .process_unit(StoryUnit::new(UnitKind::Interview, "Q: q A: a"))
        .await
        .unwrap();
    assert_eq!(interview.qa_pairs.unwrap().len(), 1);

    let short = p
        .process_unit(StoryUnit::new(UnitKind::Note, "brief note"))
        .await
        .unwrap();
    assert_eq!(short.content, "brief note");
    assert_eq!(mock.requests().len(), 1);

    let long = p
        .process_unit(StoryUnit::new(UnitKind::Research, words(SUMMARY_THRESHOLD_WORDS + 1)))
        .await
        .unwrap();
    assert_eq!(long.content, "condensed");
    assert!(long.original_content.is_some());
    assert_eq!(mock.requests().len(), 2);
}
