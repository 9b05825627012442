//! The interactive half of the command line: asking for a topic and for
//! approval to publish. Input and output are passed in so the session can be
//! driven from tests.

use std::io::{self, BufRead, Write};

const TOPIC_PROMPT: &str = "Enter blog topic: ";
const PUBLISH_PROMPT: &str = "Publish this article? (yes/no): ";

/// Prompts for a blog topic and returns the trimmed answer. End of input
/// yields an empty topic.
pub fn ask_topic<R, W>(input: &mut R, output: &mut W) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    Ok(ask(input, output, TOPIC_PROMPT)?
        .map(|line| line.trim().to_owned())
        .unwrap_or_default())
}

/// Prompts until the answer is `yes`/`y` or `no`/`n` (any case). End of
/// input counts as "no".
pub fn confirm_publish<R, W>(input: &mut R, output: &mut W) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    loop {
        let answer = match ask(input, output, PUBLISH_PROMPT)? {
            Some(answer) => answer.trim().to_lowercase(),
            None => return Ok(false),
        };
        match answer.as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(output, "Please answer yes or no.")?,
        }
    }
}

// Writes `prompt` and reads one line; `None` at end of input.
fn ask<R, W>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    match input.read_line(&mut line)? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_topic() -> io::Result<()> {
        let mut output = Vec::new();
        let mut input = Cursor::new("  ransomware trends \n");
        let topic = ask_topic(&mut input, &mut output)?;
        assert_eq!("ransomware trends", topic);
        assert_eq!(TOPIC_PROMPT.as_bytes(), &output[..]);
        Ok(())
    }

    #[test]
    fn test_ask_topic_at_end_of_input() -> io::Result<()> {
        assert_eq!("", ask_topic(&mut Cursor::new(""), &mut Vec::new())?);
        Ok(())
    }

    #[test]
    fn test_confirm_reprompts_until_answered() -> io::Result<()> {
        let mut output = Vec::new();
        let mut input = Cursor::new("maybe\n\nYES\n");
        assert!(confirm_publish(&mut input, &mut output)?);
        let output = String::from_utf8_lossy(&output);
        assert_eq!(3, output.matches(PUBLISH_PROMPT).count());
        assert_eq!(2, output.matches("Please answer yes or no.").count());
        Ok(())
    }

    #[test]
    fn test_confirm_no() -> io::Result<()> {
        assert!(!confirm_publish(&mut Cursor::new("n\n"), &mut Vec::new())?);
        assert!(!confirm_publish(&mut Cursor::new(" No \n"), &mut Vec::new())?);
        Ok(())
    }

    #[test]
    fn test_confirm_at_end_of_input() -> io::Result<()> {
        assert!(!confirm_publish(&mut Cursor::new("what\n"), &mut Vec::new())?);
        Ok(())
    }
}
