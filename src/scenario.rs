//! The built-in PL/SQL conversion scenario.
//!
//! Five participants collaborate to rewrite an Oracle PL/SQL procedure as a
//! runnable C# program: a coordinating admin, a coder, a code reviewer, a
//! code runner, and a user proxy. This module wires up the workflow graph,
//! the agent roster, and the seed query from fixture data.

use std::sync::Arc;

use crate::agents::{
    Agent, AgentProfile, AssistantAgent, CodeRunnerAgent, UserProxyAgent,
};
use crate::clients::ChatModel;
use crate::driver::DriverConfig;
use crate::exec::CodeExecutor;
use crate::fixtures::ScenarioFixtures;
use crate::graphs::{GraphBuilder, GraphError, WorkflowGraph, guards};
use crate::message::Message;

pub const ADMIN: &str = "admin";
pub const CODER: &str = "coder";
pub const REVIEWER: &str = "reviewer";
pub const RUNNER: &str = "runner";
pub const USER: &str = "user";

pub const MAX_ROUNDS: u64 = 30;
pub const TERMINATE: &str = "TERMINATE";

const ADMIN_PROMPT: &str = r#"You manage a group chat that solves a coding problem supplied by the user. Break the problem into small tasks and hand each task to the right participant:
- coder: writes dotnet code for a task
- runner: executes the coder's dotnet code

Work loop:
- Take the coding problem from the user.
- Split it into small tasks. For each task, ask coder to write the code, then ask runner to execute it. If the code contains unit tests, have runner pass them before running the program.
- When a task is done, summarize what happened and move to the next task.
- Never paste code back to coder; coder keeps the code and extends it incrementally.
- Repeat until the whole problem is solved.

Assign a task with this json format:
```task
{
    "to": "{agent_name}",
    "task": "{a short description of the task}",
    "context": "{previous context from scratchpad}"
}
```

Ask the user for missing information with:
```ask
{
    "question": "{question}"
}
```

When the problem is solved, send the user a summary:
```summary
{
    "problem": "{coding problem}",
    "steps": [
        {
            "step": "{step}",
            "result": "{result}"
        }
    ]
}
```

Every reply must contain exactly one of [task|ask|summary]."#;

const CODER_PROMPT: &str = r#"You are a dotnet coder. You write dotnet code that resolves the assigned task, then ask runner to execute it. Rules:
- Put code between ```csharp and ```.
- Prefer `var` over explicit types.
- Avoid external libraries; stick to the .NET Core library.
- Use top level statements.
- Always print the result to the console.
- Keep the style strict and consistent, and do not repeat yourself.
- Give every function XML documentation comments.
- Make every function testable and cover it with unit tests using Xunit and FluentAssertions.

If you need nuget packages, list them as:
```nuget
nuget_package_name
```

If your code turns out to be wrong, fix it and send it again."#;

const REVIEWER_PROMPT: &str = r#"You review code from coder. Check all of the following:
- The reply contains at least one code block between ```csharp and ```.
- There is exactly one code block, and it is csharp.
- The code uses top level statements, not a main function.
- The style is strict and consistent.
- Every function has XML documentation comments.
- No member shares a name with its enclosing type.

Put your verdict between ```review and ```. Use result APPROVED when everything passes, otherwise REJECTED with clear comments.

## Example 1 ##
```review
comment: The code satisfies all conditions.
result: APPROVED
```

## Example 2 ##
```review
comment: The code is inside a main function. Rewrite it with top level statements.
result: REJECTED
```"#;

/// Builds the conversion workflow graph.
///
/// From the admin, eligible targets are tried in order coder, runner, user;
/// the runner edge additionally requires that the coder has already spoken.
/// Coder always hands to reviewer, and reviewer, runner, and user always
/// hand back to admin.
///
/// # Errors
///
/// Construction is static, so this only fails if the edge wiring here is
/// ever broken.
pub fn workflow() -> Result<WorkflowGraph, GraphError> {
    GraphBuilder::new()
        .add_participant(ADMIN)
        .add_participant(CODER)
        .add_participant(REVIEWER)
        .add_participant(RUNNER)
        .add_participant(USER)
        .add_guarded_edge(ADMIN, CODER, guards::last_sender_is(ADMIN))
        .add_edge(CODER, REVIEWER)
        .add_edge(REVIEWER, ADMIN)
        .add_guarded_edge(
            ADMIN,
            RUNNER,
            guards::all_of(vec![guards::last_sender_is(ADMIN), guards::has_spoken(CODER)]),
        )
        .add_edge(RUNNER, ADMIN)
        .add_guarded_edge(ADMIN, USER, guards::last_sender_is(ADMIN))
        .add_edge(USER, ADMIN)
        .build()
}

/// Assembles the agent roster for the scenario.
pub fn agents(model: Arc<dyn ChatModel>, executor: Arc<dyn CodeExecutor>) -> Vec<Arc<dyn Agent>> {
    vec![
        Arc::new(AssistantAgent::new(
            AgentProfile::new(ADMIN, ADMIN_PROMPT),
            Arc::clone(&model),
        )),
        Arc::new(AssistantAgent::new(
            AgentProfile::new(CODER, CODER_PROMPT).with_temperature(0.4),
            Arc::clone(&model),
        )),
        Arc::new(AssistantAgent::new(
            AgentProfile::new(REVIEWER, REVIEWER_PROMPT),
            model,
        )),
        Arc::new(
            CodeRunnerAgent::new(RUNNER, CODER, executor)
                .with_languages(["csharp"])
                .with_default_reply("No code available, coder, please write code"),
        ),
        Arc::new(UserProxyAgent::new(USER, TERMINATE)),
    ]
}

/// Driver policy for the scenario: 30 rounds, user's TERMINATE ends the run.
#[must_use]
pub fn driver_config() -> DriverConfig {
    DriverConfig::default()
        .with_max_rounds(MAX_ROUNDS)
        .with_termination_signal(TERMINATE)
        .with_terminal_sender(USER)
}

/// Builds the user's opening query from the fixture data.
#[must_use]
pub fn user_query(fixtures: &ScenarioFixtures) -> String {
    format!(
        r#"Please rewrite this Oracle PL/SQL function into a dotnet code function. Code should be written as a single program.
The function should return the results as a logical structure. Then print it similar to the PL/SQL output.

PL/SQL function:
```
{procedure}
```

For context, here's the tables used in the PL/SQL function:
```
{tables}
```

Departments data:
```
{departments}
```

Employees data:
```
{employees}
```

Salaries data:
```
{salaries}
```

When you are satisfied with the code, send the code to runner to run the code and present the result to user. For the test use hardcoded CSV data provided above. No need for logic reading for CSV-files.
Logic should be written so it can easily be changed to read from the production Oracle database. That solution will use entity framework to read data from Oracle database and LINQ to query the data.
Use record type instead of class for the data structure. This needs to be included in a single program.

The expected output for Department 1 should be:
```
Emp ID: 201, Name: John Doe, Salary: 50000, Bonus: 5000
Emp ID: 202, Name: Jane Smith, Salary: 55000, Bonus: 5500
Total Salary for Department 1: 115500
```"#,
        procedure = fixtures.procedure.trim_end(),
        tables = fixtures.tables.trim_end(),
        departments = fixtures.departments.trim_end(),
        employees = fixtures.employees.trim_end(),
        salaries = fixtures.salaries.trim_end(),
    )
}

/// The seed message that opens the run, sent by the user proxy.
#[must_use]
pub fn seed_message(fixtures: &ScenarioFixtures) -> Message {
    Message::new(USER, &user_query(fixtures))
}
