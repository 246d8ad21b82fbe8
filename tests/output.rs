use taskheap::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("Next task: ship");
    human.push_summary("Pending", "3");
    human.push_detail("[1] ship (due 2025-01-01T00:00:00)");
    human.push_warning("snapshot save failed");
    human.push_next_step("taskheap complete \"ship\"");

    let rendered = format_human(&human);
    assert!(rendered.contains("Next task: ship"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- Pending: 3"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- [1] ship (due 2025-01-01T00:00:00)"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("- snapshot save failed"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- taskheap complete \"ship\""));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("Pending tasks");
    let rendered = format_human(&human);
    assert_eq!(rendered, "Pending tasks");
}
