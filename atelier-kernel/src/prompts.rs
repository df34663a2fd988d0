//! Prompt templates for every workflow step.
//!
//! These are deliberately plain string constants: the workflow composes them
//! with project context at call time, and operators can override any of them
//! through the `[prompts]` config table.

pub const APP_CATEGORIES: &[&str] = &[
    "Productivity",
    "Coding",
    "Project Management",
    "Games",
    "Communication",
    "Entertainment",
    "Finance",
    "Health & Fitness",
    "Education",
    "Travel & Navigation",
    "Utilities",
    "Creative",
    "E-commerce",
];

/// The single classification question asked once per workflow invocation.
pub const INTENT_QUESTION: &str = "Based on the conversation so far, select the statement that best describes what the user is asking for, given that you build and edit web applications.";

pub const PLAN_PROMPT: &str = r#"
You are an application planner. Given the user's description of a web
application, produce a detailed, structured plan for a single-file web app.
- Announce the name of the app.
- Restate the user requirements precisely.
- Keep any useful information about libraries or code examples.
- Plan the user interface elements and the use cases.
- The app is a single html file with css and javascript.
Respond only with the plan as markdown. Do not ask for more information.
"#;

pub const DESCRIPTION_PROMPT: &str = r#"
Your objective is to build the description record for a web application.
The user describes the application; answer with a yaml document inside a
yaml markdown tag and nothing else.
If the user explicitly proposed a name, use that name.
Do not ask the user for any extra information.
"#;

pub const DESCRIPTION_UPDATE_PROMPT: &str = r#"
The user is asking to modify the description record of an existing web
application. Rebuild the yaml document, keeping every field the user did not
ask to change. Answer with the yaml content inside a yaml markdown tag and
nothing else.
"#;

pub const FRONTEND_PROMPT: &str = r#"
Your objective is to build the index.html file for a web application.
The user describes the application; produce a single html document that
fulfills it.
- Make the application visually appealing; prefer reactive design.
- The output must be a single html markdown code tag.
- Do not leave placeholders. The code must be complete and work out of the
  box.
- Do not ask the user for any extra information.
"#;

pub const BACKEND_PROMPT: &str = r#"
Your objective is to build the server.py file for a web application.
Produce a FastAPI server that fulfills the application requirements.
- Include all necessary imports, create the app, implement every endpoint.
- The client runs on a different origin: accept CORS from all localhost
  sources, bind to localhost on the configured port.
- The output must be a single python markdown code tag.
- Do not leave placeholders. The code must be complete and work out of the
  box.
"#;

/// Full-rewrite update mode: the model re-emits the whole artifact.
pub const FULL_REWRITE_PROMPT: &str = r#"
Rewrite the code to fit the user's request.
ANY SHORTCUTS OR PLACEHOLDERS = INSTANT REJECTION.
Write every single line of code; the result must be complete and working.
Answer with a single markdown code tag and nothing else.
"#;

/// Targeted-edit update mode: the model emits REPLACE blocks that the
/// patcher applies with best-effort matching.
pub const EDIT_BLOCK_PROMPT: &str = r#"
Update the given code using edit blocks. To update existing code, emit:
```
# REPLACE
# ORIGINAL
<old_code>
# SET
<new_code>
```
The ORIGINAL section must contain verbatim code from the file, a full
statement rather than a fragment. The SET section is mandatory and must be
fully working code without placeholders. To insert code, put the last
unchanged line in ORIGINAL, then repeat it in SET followed by the new lines.
If so much changes that a rewrite is cleaner, emit instead:
```
# FULL_REWRITE
<new_full_code>
```
Choose between edit blocks and a full rewrite based on the amount of text to
update.
"#;

pub const DOCUMENTATION_PROMPT: &str = r#"
You are an application documenter. Write documentation for this web app in
markdown format, shaped by what the user asked for. Answer with the
generated documentation and nothing else.
"#;

pub const ENDPOINT_SUMMARY_PROMPT: &str = r#"
You are a backend summarizer. Extract from the server code every endpoint
with its input and output format, plus the server address, port number and
CORS posture. Answer with the endpoint description only.
"#;

pub const ICON_PROMPT: &str = r#"
Make an icon for this application. The icon should depict the essence of the
application as given in its description record.
"#;
