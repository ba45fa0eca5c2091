use crate::problem::ProblemModel;

/// Wire contract with the model for Reveal-mode replies: the pseudocode
/// portion must be bounded by these exact markers.
pub const PSEUDOCODE_START: &str = "<<<PSEUDOCODE_START>>>";
pub const PSEUDOCODE_END: &str = "<<<PSEUDOCODE_END>>>";

/// Fixed synthetic request used to kick off a session. It is sent once and
/// never appended to the conversation history.
pub(crate) fn opening_request() -> &'static str {
    "Please start our session by briefly acknowledging the problem and asking \
     me one opening question about my approach."
}

/// System instruction for one exchange. `reveal_pseudo` selects between the
/// default interrogate mode and the one-shot pseudocode disclosure.
pub(crate) fn build_system_prompt(
    problem: &ProblemModel,
    reveal_pseudo: bool,
    attempt_threshold: u32,
) -> String {
    let code_section = match &problem.user_code {
        Some(code) => format!(
            "\n\nSTUDENT'S CURRENT CODE ({}):\n```{}\n{}\n```",
            problem.language, problem.language, code
        ),
        None => "\n\nSTUDENT HAS NOT WRITTEN ANY CODE YET.".to_string(),
    };

    let role_instruction = if reveal_pseudo {
        format!(
            "The student has made {attempt_threshold} attempts without solving it.\n\
             NOW you should:\n\
             1. Give a brief encouraging message\n\
             2. Provide PSEUDOCODE ONLY - not real code - that outlines the algorithm step by step\n\
             3. Wrap it: {PSEUDOCODE_START} ... {PSEUDOCODE_END}\n\
             4. After the block, ask them to now try implementing it"
        )
    } else {
        "NEVER give the actual answer or working code.\n\
         NEVER write code for them.\n\
         Ask ONE focused Socratic question that:\n\
         - Points to a flaw or gap in their thinking\n\
         - Guides them toward the right approach\n\
         - Relates to their actual code if they have any\n\
         Keep response SHORT (2-4 sentences) and end with a question."
            .to_string()
    };

    let examples = if problem.examples.is_empty() {
        "Not available".to_string()
    } else {
        problem.examples.join("\n\n")
    };

    format!(
        "You are CodeMentor, a Socratic programming tutor helping a student on {platform}.\n\
         \n\
         PROBLEM: {title}\n\
         DIFFICULTY: {difficulty}\n\
         \n\
         PROBLEM DESCRIPTION:\n\
         {description}\n\
         \n\
         EXAMPLES / TEST CASES:\n\
         {examples}\n\
         \n\
         CONSTRAINTS:\n\
         {constraints}\
         {code_section}\n\
         \n\
         YOUR ROLE:\n\
         {role_instruction}\n\
         \n\
         Tone: Encouraging, patient, like a senior dev doing code review. Never condescending.",
        platform = problem.platform.display_name(),
        title = problem.display_title(),
        difficulty = problem.difficulty.as_str(),
        description = if problem.description.is_empty() {
            "Not available"
        } else {
            &problem.description
        },
        constraints = problem.constraints.as_deref().unwrap_or("Not available"),
    )
}
