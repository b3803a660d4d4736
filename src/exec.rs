//! Code block extraction and sandboxed-ish process execution.
//!
//! The runner agent pulls fenced code blocks out of message content and
//! executes them through a [`CodeExecutor`]. The default [`ProcessExecutor`]
//! stages each block as a file in a scratch directory and runs a configured
//! interpreter over it with a timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

/// A fenced code block lifted out of message content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag from the opening fence, lowercased. Empty when the fence
    /// carried no tag.
    pub language: String,
    pub source: String,
}

/// Extracts fenced code blocks (```lang ... ```) from message content.
///
/// Parsing is line-based: a fence line opens a block, the next fence line
/// closes it. An unterminated trailing block is dropped rather than guessed
/// at.
///
/// # Examples
///
/// ```
/// use colloquy::exec::extract_code_blocks;
///
/// let content = "Here you go:\n```python\nprint('hi')\n```\ndone";
/// let blocks = extract_code_blocks(content);
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].language, "python");
/// assert_eq!(blocks[0].source, "print('hi')\n");
/// ```
#[must_use]
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("```") {
            match current.take() {
                Some(block) => blocks.push(block),
                None => {
                    current = Some(CodeBlock {
                        language: rest.trim().to_lowercase(),
                        source: String::new(),
                    });
                }
            }
        } else if let Some(block) = current.as_mut() {
            block.source.push_str(line);
            block.source.push('\n');
        }
    }
    blocks
}

/// The observable result of executing one code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl ExecOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_status == 0
    }

    /// Renders the outcome as reply content for the transcript.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.stdout.is_empty() {
            out.push_str(self.stdout.trim_end());
            out.push('\n');
        }
        if !self.stderr.is_empty() {
            out.push_str("stderr:\n");
            out.push_str(self.stderr.trim_end());
            out.push('\n');
        }
        if self.succeeded() {
            out.push_str("exit status: 0");
        } else {
            out.push_str(&format!("exit status: {}", self.exit_status));
        }
        out
    }
}

/// Errors from staging or running a code block.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecError {
    /// Writing the block to the scratch directory failed.
    #[error("failed to stage code block")]
    #[diagnostic(code(colloquy::exec::stage))]
    Stage(#[from] std::io::Error),

    /// The interpreter process could not be launched.
    #[error("failed to launch '{command}'")]
    #[diagnostic(
        code(colloquy::exec::launch),
        help("Make sure the interpreter is installed and on PATH.")
    )]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process outlived the configured timeout and was killed.
    #[error("execution timed out after {seconds}s")]
    #[diagnostic(code(colloquy::exec::timeout))]
    Timeout { seconds: u64 },
}

/// Executes code blocks, however the implementation sees fit.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Runs one block to completion.
    ///
    /// A non-zero exit status is a successful execution with a failing
    /// outcome, not an error; errors are reserved for the executor itself
    /// failing to stage or launch.
    async fn execute(&self, block: &CodeBlock) -> Result<ExecOutcome, ExecError>;
}

/// Runs each block through an external interpreter process.
pub struct ProcessExecutor {
    program: String,
    args: Vec<String>,
    extension: String,
    workdir: PathBuf,
    timeout: Duration,
}

impl ProcessExecutor {
    /// Creates an executor that invokes `program [args..] <staged-file>`.
    #[must_use]
    pub fn new(program: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            extension: extension.into(),
            workdir: std::env::temp_dir().join("colloquy-exec"),
            timeout: Duration::from_secs(60),
        }
    }

    /// Fixed arguments passed before the staged file path.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CodeExecutor for ProcessExecutor {
    #[instrument(skip(self, block), fields(program = %self.program, language = %block.language))]
    async fn execute(&self, block: &CodeBlock) -> Result<ExecOutcome, ExecError> {
        std::fs::create_dir_all(&self.workdir)?;
        let staged = self
            .workdir
            .join(format!("{}.{}", Uuid::new_v4(), self.extension));
        std::fs::write(&staged, &block.source)?;
        debug!(path = %staged.display(), "staged code block");

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&staged)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.output();
        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|source| ExecError::Launch {
                command: self.program.clone(),
                source,
            })?,
            Err(_) => {
                let _ = std::fs::remove_file(&staged);
                return Err(ExecError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };
        let _ = std::fs::remove_file(&staged);

        Ok(ExecOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_status: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tagged_block() {
        let blocks = extract_code_blocks("intro\n```csharp\nvar x = 1;\n```\noutro");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "csharp");
        assert_eq!(blocks[0].source, "var x = 1;\n");
    }

    #[test]
    fn extracts_multiple_blocks_in_order() {
        let content = "```python\na\n```\ntext\n```\nb\n```";
        let blocks = extract_code_blocks(content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "python");
        assert_eq!(blocks[1].language, "");
        assert_eq!(blocks[1].source, "b\n");
    }

    #[test]
    fn language_tag_is_lowercased() {
        let blocks = extract_code_blocks("```CSharp\nx\n```");
        assert_eq!(blocks[0].language, "csharp");
    }

    #[test]
    fn unterminated_block_is_dropped() {
        let blocks = extract_code_blocks("```python\nprint('oops')");
        assert!(blocks.is_empty());
    }

    #[test]
    fn no_blocks_in_plain_text() {
        assert!(extract_code_blocks("just prose, no fences").is_empty());
    }

    #[test]
    fn render_includes_stderr_and_status() {
        let outcome = ExecOutcome {
            stdout: "hello\n".into(),
            stderr: "warning\n".into(),
            exit_status: 2,
        };
        let rendered = outcome.render();
        assert!(rendered.contains("hello"));
        assert!(rendered.contains("stderr:\nwarning"));
        assert!(rendered.ends_with("exit status: 2"));
        assert!(!outcome.succeeded());
    }
}
