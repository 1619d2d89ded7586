use super::*;

fn group() -> ConsolidatedErrorGroup {
    ConsolidatedErrorGroup {
        error_type: Some("OperationalError".to_string()),
        sample_message: "x".repeat(2500),
        count: 12,
        services: vec!["api".to_string(), "web".to_string()],
        ..ConsolidatedErrorGroup::default()
    }
}

#[test]
fn title_and_body_carry_group_details() {
    let g = group();
    assert_eq!(issue_title("abc123", &g), "[ERROR-abc123] OperationalError");
    let body = issue_body("abc123", &g);
    assert!(body.contains("**ID:** `ERROR-abc123`"));
    assert!(body.contains("**Ocurrencias:** 12"));
    assert!(body.contains("**Servicios:** api, web"));
    assert!(body.contains(&"x".repeat(SAMPLE_MESSAGE_MAX)));
    assert!(!body.contains(&"x".repeat(SAMPLE_MESSAGE_MAX + 1)));
}

#[test]
fn url_targets_compose_page_with_labels() {
    let url = new_issue_url("/acme/dash/", "abc123", &group()).expect("url");
    assert_eq!(url.host_str(), Some("github.com"));
    assert_eq!(url.path(), "/acme/dash/issues/new");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(pairs[0].0, "title");
    assert_eq!(pairs[0].1, "[ERROR-abc123] OperationalError");
    assert_eq!(pairs[2], ("labels".to_string(), "bug,manual".to_string()));
}

#[test]
fn issue_action_needs_three_occurrences_and_no_issue() {
    let mut g = group();
    assert!(can_open_issue(&g, false));
    assert!(!can_open_issue(&g, true));
    g.count = 2;
    assert!(!can_open_issue(&g, false));
}
