use crate::dispatcher::Interpreter;
use crate::error::Result;
use std::io::{BufRead, Write};
use tracing::error;

pub const GREETING: &str = "Hi I'm Analytica, let's analyse some diamond data together!";
pub const INSTRUCTIONS: &str = "Type 'help' for commands and 'exit' to stop";
pub const FAREWELL: &str = "I hope you got your answers, see you soon.";

/// Blocking read-answer loop over any line source and sink.
pub struct Session<'i, 'a, R, W> {
    interpreter: &'i Interpreter<'a>,
    input: R,
    output: W,
}

impl<'i, 'a, R: BufRead, W: Write> Session<'i, 'a, R, W> {
    pub fn new(interpreter: &'i Interpreter<'a>, input: R, output: W) -> Self {
        Self {
            interpreter,
            input,
            output,
        }
    }

    /// Run until the user types `exit` or input ends.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "\n{}", GREETING)?;
        writeln!(self.output, "{}\n", INSTRUCTIONS)?;

        let mut line = String::new();
        loop {
            write!(self.output, "You: ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let query = line.trim_end_matches(['\r', '\n']);

            if query.to_lowercase() == "exit" {
                writeln!(self.output, "Ana: {}", FAREWELL)?;
                break;
            }

            match self.interpreter.respond(query) {
                Ok(response) => writeln!(self.output, "Ana: {} \n", response)?,
                Err(e) => {
                    error!("Query '{}' failed: {}", query, e);
                    writeln!(self.output, "Ana: Something went wrong: {} \n", e)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::DatasetContext;
    use polars::prelude::*;

    fn ctx() -> DatasetContext {
        let df = df![
            "cut" => [1.408, 0.435],
            "color" => ["e", "d"],
            "clarity" => ["si1", "vs2"],
            "price" => [326i64, 500]
        ]
        .unwrap();
        DatasetContext::from_frame(df).unwrap()
    }

    fn run(input: &str) -> String {
        let ctx = ctx();
        let interpreter = Interpreter::new(&ctx, Config::default());
        let mut output = Vec::new();
        Session::new(&interpreter, input.as_bytes(), &mut output).run().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_exit_is_case_insensitive() {
        let out = run("rows\nEXIT\nrows\n");
        assert!(out.contains(GREETING));
        assert!(out.contains("Ana: Total rows: 2"));
        assert!(out.ends_with(&format!("Ana: {}\n", FAREWELL)));
        assert_eq!(out.matches("Total rows").count(), 1);
    }

    #[test]
    fn test_eof_ends_session() {
        let out = run("foobar");
        assert!(out.contains("Ana: Unknown command. Type 'help'"));
        assert!(!out.contains(FAREWELL));
    }
}
