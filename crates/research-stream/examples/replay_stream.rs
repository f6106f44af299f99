use std::sync::Arc;
use std::time::Duration;

use research_stream::prelude::*;
use research_stream::replay::ScriptedEngine;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ResearchError> {
    let engine = ScriptedEngine::new(vec![
        RawEvent::agent_updated("Planner agent"),
        RawEvent::tool_call("plan_searches"),
        RawEvent::tool_call_output(serde_json::json!({"searches": 3})),
        RawEvent::agent_updated("Search agent"),
        RawEvent::tool_call("web_search"),
        RawEvent::tool_call_output(serde_json::json!("...")),
        RawEvent::message_output("Batteries are getting denser."),
    ])
    .event_delay(Duration::from_millis(300))
    .final_result(FinalResult::Report(ReportData {
        short_summary: "Density is up.".into(),
        markdown_report: "# Battery report\n\nDensity keeps improving.".into(),
        follow_up_questions: vec!["What about cost?".into()],
    }));

    let researcher = Researcher::builder().engine(Arc::new(engine)).build()?;
    let mut run = researcher.run("State of battery research").await?;
    while let Some(render) = run.next_render().await {
        println!("{render}\n----");
    }
    Ok(())
}
